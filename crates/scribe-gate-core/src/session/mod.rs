pub(crate) mod adapter;
mod navigation;
mod request;

pub use {
    adapter::SessionAdapter,
    navigation::{Navigation, Navigator},
    request::RequestOptions,
};
