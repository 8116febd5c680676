// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

// ---
// Validações customizadas usadas pelos payloads
// ---

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("must_not_be_negative".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("must_be_positive".into());
        return Err(err);
    }
    Ok(())
}

/// Texto obrigatório: só espaços conta como vazio.
pub fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must_not_be_blank".into());
        return Err(err);
    }
    Ok(())
}

/// GSTIN: 2 dígitos (estado) + PAN (5 letras, 4 dígitos, 1 letra)
/// + 1 alfanumérico (entidade) + 'Z' + 1 alfanumérico (checksum).
pub fn validate_gst_no(val: &str) -> Result<(), ValidationError> {
    if is_valid_gstin(val) {
        Ok(())
    } else {
        let mut err = ValidationError::new("gst_no");
        err.message = Some("invalid_gst_no".into());
        Err(err)
    }
}

fn is_valid_gstin(val: &str) -> bool {
    let b = val.as_bytes();
    if b.len() != 15 {
        return false;
    }

    let digits = |r: std::ops::Range<usize>| b[r].iter().all(u8::is_ascii_digit);
    let letters = |r: std::ops::Range<usize>| b[r].iter().all(u8::is_ascii_uppercase);
    let alnum = |c: u8| c.is_ascii_digit() || c.is_ascii_uppercase();

    digits(0..2)
        && letters(2..7)
        && digits(7..11)
        && letters(11..12)
        && alnum(b[12])
        && b[12] != b'0'
        && b[13] == b'Z'
        && alnum(b[14])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_gstin() {
        assert!(validate_gst_no("27AAPFU0939F1ZV").is_ok());
        assert!(validate_gst_no("29ABCDE1234F2Z5").is_ok());
    }

    #[test]
    fn rejects_malformed_gstin() {
        for bad in ["", "27AAPFU0939F1Z", "27aapfu0939f1zv", "27AAPFU0939F0ZV", "27AAPFU0939F1XV", "AAAAPFU0939F1ZV"] {
            assert!(validate_gst_no(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("\t\n").is_err());
        assert!(validate_not_blank(" ok ").is_ok());
    }

    #[test]
    fn money_rules() {
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&Decimal::new(1, 2)).is_ok());
    }
}
