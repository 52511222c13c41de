use crate::cmd::{Coord, FigCmd};
use crate::error::ParseError;

/// Parses figure command text into a list of commands.
///
/// Lines are independent. Blank lines and lines starting with `#` are
/// skipped. Every other line must start with a recognized keyword
/// (`POINT`, `LINE`, `TRIANGLE`; case-insensitive) followed by
/// whitespace-separated `x,y,z` coordinate triples.
pub fn parse_str(src: &str) -> Result<Vec<FigCmd>, ParseError> {
    let mut cmds = Vec::new();

    for (idx, raw) in src.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        // Non-empty after trim, so the keyword token exists.
        let keyword = parts.next().unwrap_or_default();
        let coords = parse_coords(parts, line_no)?;

        let cmd = match keyword.to_ascii_uppercase().as_str() {
            "POINT" => {
                let [c] = expect_coords::<1>(&coords, "POINT", line_no)?;
                FigCmd::Point(c)
            }
            "LINE" => FigCmd::Line(expect_coords::<2>(&coords, "LINE", line_no)?),
            "TRIANGLE" => FigCmd::Triangle(expect_coords::<3>(&coords, "TRIANGLE", line_no)?),
            other => {
                return Err(ParseError::new(format!("unknown keyword `{other}`"), line_no));
            }
        };
        cmds.push(cmd);
    }

    Ok(cmds)
}

fn parse_coords<'a>(
    parts: impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<Vec<Coord>, ParseError> {
    let mut coords = Vec::new();
    for token in parts {
        let mut values = [0.0f32; 3];
        let mut count = 0;
        for field in token.split(',') {
            if count == 3 {
                count += 1; // flag overflow, report below
                break;
            }
            values[count] = field.trim().parse::<f32>().map_err(|_| {
                ParseError::new(format!("invalid coordinate `{field}` in `{token}`"), line_no)
            })?;
            count += 1;
        }
        if count != 3 {
            return Err(ParseError::new(
                format!("expected `x,y,z` triple, got `{token}`"),
                line_no,
            ));
        }
        coords.push(values);
    }
    Ok(coords)
}

fn expect_coords<const N: usize>(
    coords: &[Coord],
    keyword: &str,
    line_no: usize,
) -> Result<[Coord; N], ParseError> {
    if coords.len() != N {
        return Err(ParseError::new(
            format!("{keyword} expects {N} coordinate triple(s), got {}", coords.len()),
            line_no,
        ));
    }
    let mut out = [[0.0f32; 3]; N];
    out.copy_from_slice(coords);
    Ok(out)
}
