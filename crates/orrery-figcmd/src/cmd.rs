use std::fmt;

/// A 3D coordinate triple as it appears in command text (`x,y,z`).
pub type Coord = [f32; 3];

/// One figure command. Each command corresponds to exactly one figure when
/// handed to a scene builder.
#[derive(Debug, Clone, PartialEq)]
pub enum FigCmd {
    /// `POINT x,y,z`
    Point(Coord),
    /// `LINE x1,y1,z1 x2,y2,z2`
    Line([Coord; 2]),
    /// `TRIANGLE x1,y1,z1 x2,y2,z2 x3,y3,z3`
    Triangle([Coord; 3]),
}

impl FigCmd {
    /// The keyword that introduces this command in text form.
    pub fn keyword(&self) -> &'static str {
        match self {
            FigCmd::Point(_) => "POINT",
            FigCmd::Line(_) => "LINE",
            FigCmd::Triangle(_) => "TRIANGLE",
        }
    }

    /// The coordinates of this command in declaration order.
    pub fn coords(&self) -> &[Coord] {
        match self {
            FigCmd::Point(c) => std::slice::from_ref(c),
            FigCmd::Line(c) => c,
            FigCmd::Triangle(c) => c,
        }
    }
}

impl fmt::Display for FigCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())?;
        for c in self.coords() {
            write!(f, " {},{},{}", c[0], c[1], c[2])?;
        }
        Ok(())
    }
}
