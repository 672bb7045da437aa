use lint_fs::NormalizedPath;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_normalization_invariants(s in "[a-z./\\\\]{0,24}") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();

        prop_assert!(!as_str.contains('\\'));
        prop_assert!(!as_str.contains("//"));
        prop_assert!(as_str == "." || !as_str.split('/').any(|seg| seg == "."), "{}", as_str);

        // Cleaning is idempotent
        let again = NormalizedPath::new(as_str);
        prop_assert_eq!(&path, &again);
    }

    #[test]
    fn test_absolutize_is_absolute(rel in "[a-z]{1,6}(/[a-z]{1,6}){0,3}") {
        let base = NormalizedPath::new("/base/dir");
        let resolved = NormalizedPath::new(&rel).absolutize(&base);
        prop_assert!(resolved.is_absolute());
        prop_assert!(resolved.starts_with(&base));
        prop_assert_eq!(resolved.relative_to(&base), Some(rel.clone()));
    }
}
