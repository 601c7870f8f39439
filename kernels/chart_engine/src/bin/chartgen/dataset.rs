// Delimited dataset loading
//
// A header row names the columns; every following line becomes one Row. The
// split is a plain delimiter split with no quoting or escaping rules, which
// covers the hardware datasets this tool is fed.

use std::fs;
use std::path::Path;

use chart_engine::{Row, Value};

pub fn load(path: &Path, delimiter: char) -> Result<Vec<Row>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header: Vec<String> = match lines.next() {
        Some(line) => line.split(delimiter).map(|c| c.trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for line in lines {
        let mut row = Row::new();
        for (name, cell) in header.iter().zip(line.split(delimiter)) {
            row.push(name.clone(), Value::Text(cell.trim().to_string()));
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_header_and_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "brand,price\nncase,1500\nfractal,900").unwrap();
        let rows = load(file.path(), ',').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number("price"), Some(1500.0));
        assert_eq!(rows[1].get("brand").map(|v| v.as_text()), Some("fractal".to_string()));
    }
}
