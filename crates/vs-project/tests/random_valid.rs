use proptest::prelude::*;
use vs_project::schema::*;
use vs_project::{random_blobs, validate_config};

proptest! {
    #[test]
    fn random_blobs_pass_custom_validation(
        count in 0usize..50,
        seed in any::<u64>(),
        endpt in 0.001_f64..50.0,
    ) {
        let blobs = random_blobs(count, seed, endpt).unwrap();
        prop_assert_eq!(blobs.len(), count);

        let config = RunConfig {
            endpt,
            initial_conditions: BlobSource::Custom { blobs },
            ..RunConfig::default()
        };
        prop_assert!(validate_config(&config).is_ok());
    }
}
