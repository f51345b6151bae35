cfg_if::cfg_if! {
    if #[cfg(feature = "http")] {
        pub mod remote;
        pub use remote::*;
    }
}
