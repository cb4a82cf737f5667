//! A1 reference helpers.

/// Converts an A1 reference (`"C12"`, `"$C$12"`) to zero-based `(row, col)`.
pub fn a1_to_row_col(a1: &str) -> Result<(u32, u32), String> {
    let clean = a1.trim().replace('$', "");
    let split = clean
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| format!("Invalid cell reference: {a1}"))?;
    let (letters, digits) = clean.split_at(split);
    if letters.is_empty() {
        return Err(format!("Invalid cell reference: {a1}"));
    }

    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(format!("Invalid column letter in: {a1}"));
        }
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add((ch.to_ascii_uppercase() as u8 - b'A' + 1) as u32))
            .ok_or_else(|| format!("Column out of range: {a1}"))?;
    }
    let row: u32 = digits
        .parse()
        .map_err(|_| format!("Invalid row number in: {a1}"))?;
    if row == 0 {
        return Err(format!("Row numbers start at 1: {a1}"));
    }
    Ok((row - 1, col - 1))
}

/// Parses `"A1:B2"` (or a single cell) into normalized
/// `(first_row, first_col, last_row, last_col)`.
pub fn parse_a1_range(range_str: &str) -> Result<(u32, u32, u32, u32), String> {
    let mut parts = range_str.split(':');
    let a = parts.next().unwrap_or("");
    let b = parts.next().unwrap_or(a);

    let (r1, c1) = a1_to_row_col(a)?;
    let (r2, c2) = a1_to_row_col(b)?;

    Ok((r1.min(r2), c1.min(c2), r1.max(r2), c1.max(c2)))
}
