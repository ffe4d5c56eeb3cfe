use crate::error::ConvertError;

pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;
pub const MAX_ROWS: usize = 50_000;

pub fn check_file_size(size: u64) -> Result<(), ConvertError> {
    if size > MAX_FILE_BYTES {
        return Err(ConvertError::FileTooLarge {
            size,
            limit: MAX_FILE_BYTES,
        });
    }
    Ok(())
}

pub fn check_row_count(rows: usize) -> Result<(), ConvertError> {
    if rows > MAX_ROWS {
        return Err(ConvertError::TooManyRows {
            rows,
            limit: MAX_ROWS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{MAX_FILE_BYTES, MAX_ROWS, check_file_size, check_row_count};
    use crate::error::ConvertError;

    #[test]
    fn accepts_exactly_max_rows() {
        assert!(check_row_count(MAX_ROWS).is_ok());
    }

    #[test]
    fn rejects_one_row_over() {
        let err = check_row_count(MAX_ROWS + 1).expect_err("50,001 rows should be rejected");
        assert!(matches!(
            err,
            ConvertError::TooManyRows {
                rows: 50_001,
                limit: 50_000
            }
        ));
        assert_eq!(err.excess(), Some(1));
        assert!(err.to_string().contains("(1 over)"), "{err}");
    }

    #[test]
    fn file_size_ceiling_is_inclusive() {
        assert!(check_file_size(MAX_FILE_BYTES).is_ok());
        let err = check_file_size(MAX_FILE_BYTES + 512 * 1024).expect_err("should be too large");
        assert_eq!(err.excess(), Some(512 * 1024));
        assert!(err.to_string().contains("10.50MB"), "{err}");
        assert!(err.to_string().contains("Maximum size is 10MB"), "{err}");
        assert!(err.is_input_error());
    }
}
