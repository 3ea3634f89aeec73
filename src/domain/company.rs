//! Company list entries.

/// Width TSE securities codes are padded to.
pub const CODE_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    pub code: String,
    pub name: String,
}

impl CompanyRecord {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: normalize_code(code),
            name: name.trim().to_string(),
        }
    }

    /// Provider identifier: code plus the market suffix, e.g. `7203.T`.
    pub fn identifier(&self, market_suffix: &str) -> String {
        format!("{}{}", self.code, market_suffix)
    }
}

/// Left-pads a code with zeros to [`CODE_WIDTH`]. Longer codes pass through.
pub fn normalize_code(raw: &str) -> String {
    let trimmed = raw.trim();
    format!("{:0>width$}", trimmed, width = CODE_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_codes() {
        assert_eq!(normalize_code("1"), "0001");
        assert_eq!(normalize_code("72"), "0072");
    }

    #[test]
    fn keeps_four_character_codes() {
        assert_eq!(normalize_code("7203"), "7203");
        assert_eq!(normalize_code("130A"), "130A");
    }

    #[test]
    fn trims_before_padding() {
        assert_eq!(normalize_code(" 301 "), "0301");
    }

    #[test]
    fn longer_codes_unchanged() {
        assert_eq!(normalize_code("12345"), "12345");
    }

    #[test]
    fn identifier_appends_suffix() {
        let company = CompanyRecord::new("7203", "トヨタ自動車");
        assert_eq!(company.identifier(".T"), "7203.T");
    }
}
