// ═══════════════════════════════════════════════════════════════════
// Storage Tests — memory and file backends, record encoding
// ═══════════════════════════════════════════════════════════════════

use rust_decimal::Decimal;
use urban_crate_core::errors::CoreError;
use urban_crate_core::models::cart::CartLine;
use urban_crate_core::models::product::Product;
use urban_crate_core::models::shipping::ShippingInfo;
use urban_crate_core::storage::file::FileStorage;
use urban_crate_core::storage::memory::MemoryStorage;
use urban_crate_core::storage::record;
use urban_crate_core::storage::traits::DurableStorage;

fn product(id: &str, price: i64) -> Product {
    Product::new(
        id,
        format!("Item {id}"),
        "Brand",
        "Snacks",
        "100g",
        Decimal::from(price + 10),
        Decimal::from(price - 5),
        Decimal::from(price),
    )
}

fn line(id: &str, price: i64, qty: u32) -> CartLine {
    let mut l = CartLine::new(product(id, price));
    l.cart_quantity = qty;
    l
}

// ═══════════════════════════════════════════════════════════════════
// MemoryStorage
// ═══════════════════════════════════════════════════════════════════

mod memory_storage {
    use super::*;

    #[test]
    fn get_missing_is_none() {
        let s = MemoryStorage::new();
        assert_eq!(s.get("nope").unwrap(), None);
    }

    #[test]
    fn set_then_get() {
        let s = MemoryStorage::new();
        s.set("k", "v").unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn set_overwrites() {
        let s = MemoryStorage::new();
        s.set("k", "one").unwrap();
        s.set("k", "two").unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let s = MemoryStorage::new();
        assert!(s.remove("ghost").is_ok());
    }

    #[test]
    fn clones_share_entries() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
        b.remove("k").unwrap();
        assert!(a.is_empty());
    }

    #[test]
    fn disabled_storage_fails_every_call() {
        let s = MemoryStorage::new();
        s.set("k", "v").unwrap();
        s.set_disabled(true);
        assert!(matches!(s.get("k"), Err(CoreError::StorageUnavailable(_))));
        assert!(matches!(s.set("k", "w"), Err(CoreError::StorageUnavailable(_))));
        assert!(matches!(s.remove("k"), Err(CoreError::StorageUnavailable(_))));
        assert_eq!(s.peek("k").as_deref(), Some("v"));

        s.set_disabled(false);
        assert_eq!(s.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn quota_rejects_oversized_write() {
        let s = MemoryStorage::with_quota(10);
        s.set("ab", "12345678").unwrap(); // exactly 10 bytes
        let err = s.set("c", "x").unwrap_err();
        match err {
            CoreError::StorageQuotaExceeded { key, needed, available } => {
                assert_eq!(key, "c");
                assert_eq!(needed, 2);
                assert_eq!(available, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn quota_counts_replaced_value_as_free() {
        let s = MemoryStorage::with_quota(10);
        s.set("ab", "12345678").unwrap();
        s.set("ab", "87654321").unwrap();
        assert_eq!(s.peek("ab").as_deref(), Some("87654321"));
    }

    #[test]
    fn name() {
        assert_eq!(MemoryStorage::new().name(), "memory");
    }
}

// ═══════════════════════════════════════════════════════════════════
// FileStorage
// ═══════════════════════════════════════════════════════════════════

mod file_storage {
    use super::*;

    #[test]
    fn open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let s = FileStorage::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(s.dir(), nested.as_path());
    }

    #[test]
    fn get_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStorage::open(dir.path()).unwrap();
        assert_eq!(s.get("urbancrate-cart-realtime").unwrap(), None);
    }

    #[test]
    fn set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStorage::open(dir.path()).unwrap();
        s.set("urbancrate-shipping", "{\"a\":1}").unwrap();
        assert_eq!(
            s.get("urbancrate-shipping").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(s.path_for("urbancrate-shipping").exists());

        s.remove("urbancrate-shipping").unwrap();
        assert_eq!(s.get("urbancrate-shipping").unwrap(), None);
        assert!(s.remove("urbancrate-shipping").is_ok());
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::open(dir.path()).unwrap().set("k", "persisted").unwrap();
        let reopened = FileStorage::open(dir.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn key_is_sanitized_into_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStorage::open(dir.path()).unwrap();
        let path = s.path_for("../etc/passwd");
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(path.file_name().unwrap(), ".._etc_passwd.json");
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStorage::open(dir.path()).unwrap();
        s.set("k", "v").unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["k.json".to_string()]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Cart record
// ═══════════════════════════════════════════════════════════════════

mod cart_record {
    use super::*;

    #[test]
    fn encode_empty_is_empty_array() {
        assert_eq!(record::encode_cart(&[]).unwrap(), "[]");
    }

    #[test]
    fn roundtrip_preserves_order_and_quantities() {
        let lines = vec![line("b", 40, 2), line("a", 15, 1), line("c", 99, 7)];
        let encoded = record::encode_cart(&lines).unwrap();
        let decoded = record::decode_cart(&encoded).unwrap();
        assert_eq!(decoded, lines);
    }

    #[test]
    fn prices_keep_full_precision() {
        let mut l = line("p", 10, 3);
        l.product.mrp = "99999999.999999999".parse().unwrap();
        l.product.buy_price = "0.1".parse().unwrap();
        l.product.selling_price = "12345678.123456789".parse().unwrap();

        let encoded = record::encode_cart(std::slice::from_ref(&l)).unwrap();
        assert!(encoded.contains(r#""sellingPrice":12345678.123456789"#));
        assert!(encoded.contains(r#""buyPrice":0.1"#));

        let decoded = record::decode_cart(&encoded).unwrap();
        assert_eq!(decoded, vec![l]);
    }

    #[test]
    fn decodes_record_written_by_older_client() {
        // Extra flags from older clients are ignored; "small" maps to low.
        let raw = r#"[{"id":"3","brand":"Amul","name":"Amul Butter 500g","quantity":"500g",
            "mrp":285,"buyPrice":250,"sellingPrice":250,"category":"Dairy",
            "marginCategory":"small","isHighMargin":false,"profitMarginRupees":0,
            "imageUrl":"/placeholder.svg","cartQuantity":2}]"#;
        let lines = record::decode_cart(raw).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].cart_quantity, 2);
        assert_eq!(lines[0].product.selling_price, Decimal::from(250));
    }

    #[test]
    fn object_instead_of_array_is_rejected() {
        let err = record::decode_cart(r#"{"id":"1"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(record::decode_cart("[{").is_err());
    }

    #[test]
    fn line_missing_fields_is_rejected() {
        assert!(record::decode_cart(r#"[{"id":"1","cartQuantity":1}]"#).is_err());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let raw = record::encode_cart(&[line("a", 10, 0)]).unwrap();
        let err = record::decode_cart(&raw).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecord(_)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = record::encode_cart(&[line("a", 10, 1), line("a", 10, 2)]).unwrap();
        let err = record::decode_cart(&raw).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Shipping record
// ═══════════════════════════════════════════════════════════════════

mod shipping_record {
    use super::*;

    #[test]
    fn roundtrip() {
        let info = ShippingInfo {
            name: "Ravi".into(),
            phone: "9876543210".into(),
            address: "4 Park St".into(),
            city: "Kolkata".into(),
            state: "WB".into(),
            pincode: "700016".into(),
        };
        let raw = record::encode_shipping(&info).unwrap();
        assert_eq!(record::decode_shipping(&raw).unwrap(), info);
    }

    #[test]
    fn array_is_rejected() {
        assert!(record::decode_shipping("[]").is_err());
    }
}
