// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use rust_decimal::Decimal;
use urban_crate_core::errors::CoreError;
use urban_crate_core::models::shipping::ShippingInfo;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn storage_unavailable() {
        let err = CoreError::StorageUnavailable("private browsing".into());
        assert_eq!(err.to_string(), "Storage unavailable: private browsing");
    }

    #[test]
    fn storage_quota_exceeded() {
        let err = CoreError::StorageQuotaExceeded {
            key: "urbancrate-cart-realtime".into(),
            needed: 120,
            available: 40,
        };
        assert_eq!(
            err.to_string(),
            "Storage quota exceeded writing 'urbancrate-cart-realtime': needed 120 bytes, 40 available"
        );
    }

    #[test]
    fn file_io() {
        let err = CoreError::FileIO("permission denied".into());
        assert_eq!(err.to_string(), "File I/O error: permission denied");
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("bad float".into());
        assert_eq!(err.to_string(), "Serialization error: bad float");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("expected array".into());
        assert_eq!(err.to_string(), "Deserialization error: expected array");
    }

    #[test]
    fn invalid_record() {
        let err = CoreError::InvalidRecord("quantity 0".into());
        assert_eq!(err.to_string(), "Invalid record: quantity 0");
    }

    #[test]
    fn invalid_csv() {
        let err = CoreError::InvalidCsv("missing header row".into());
        assert_eq!(err.to_string(), "Invalid CSV: missing header row");
    }

    #[test]
    fn product_not_found() {
        let err = CoreError::ProductNotFound("42".into());
        assert_eq!(err.to_string(), "Product not found: 42");
    }

    #[test]
    fn empty_cart() {
        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn below_minimum_order() {
        let err = CoreError::BelowMinimumOrder {
            minimum: Decimal::from(999),
            total: Decimal::from(760),
            shortfall: Decimal::from(239),
        };
        assert_eq!(
            err.to_string(),
            "Order total 760 is below the minimum order value 999 (short by 239)"
        );
    }

    #[test]
    fn invalid_shipping_joins_field_errors() {
        let info = ShippingInfo {
            name: "A".into(),
            phone: "123".into(),
            address: "x".into(),
            city: String::new(),
            state: String::new(),
            pincode: "400001".into(),
        };
        let err = CoreError::InvalidShipping(info.validate());
        assert_eq!(
            err.to_string(),
            "Invalid shipping details: phone: Please enter a valid 10-digit phone number; \
             city: City is required"
        );
    }

    #[test]
    fn link_open() {
        let err = CoreError::LinkOpen("no handler".into());
        assert_eq!(err.to_string(), "Could not open link: no handler");
    }

    #[test]
    fn config() {
        let err = CoreError::Config("URBAN_CRATE_UPI_ID must contain '@'".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: URBAN_CRATE_UPI_ID must contain '@'"
        );
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIO(ref m) if m == "gone"));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn question_mark_converts() {
        fn read_missing() -> Result<String, CoreError> {
            Ok(std::fs::read_to_string("/definitely/not/here.json")?)
        }
        assert!(matches!(read_missing(), Err(CoreError::FileIO(_))));
    }

    #[test]
    fn is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(CoreError::EmptyCart);
        assert_eq!(err.to_string(), "Cart is empty");
    }
}
