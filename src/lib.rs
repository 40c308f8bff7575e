pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod google_play_billing_datasource;
        pub(crate) mod store_kit_datasource;
        mod utils;
    }
    pub(crate) mod models {
        pub(crate) mod google_play_billing {
            pub(crate) mod billing_result_model;
            pub(crate) mod product_details_model;
            pub(crate) mod purchase_model;
        }
        pub(crate) mod store_kit {
            pub(crate) mod common;
            pub(crate) mod product_model;
            pub(crate) mod purchase_result_model;
            pub(crate) mod subscription_status_model;
            pub(crate) mod transaction_model;
        }
    }
    pub(crate) mod repositories {
        pub(crate) mod google_play_iap_repository_impl;
        pub(crate) mod store_kit_iap_repository_impl;
        mod transaction_normalizer;
    }
}

pub mod domain {
    pub mod entities {
        pub mod entitlement;
        pub mod platform_event;
        pub mod product;
        pub mod product_status;
        pub mod product_type;
        pub mod purchase;
        pub mod purchase_options;
    }
    pub mod repositories {
        pub mod iap_repository;
    }
    pub(crate) mod services {
        pub(crate) mod entitlement_scanner;
        pub(crate) mod lifecycle_finalizer;
        pub(crate) mod purchase_correlator;
    }
}

pub mod bridge;
pub mod config;
pub mod errors;
pub mod util;
