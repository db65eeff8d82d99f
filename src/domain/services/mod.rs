mod translator;

pub use translator::{
    MonitorSnapshot, PoolSnapshot, Translator, VipSnapshot, APP_PROFILE_PERSISTENCE,
    APP_PROFILE_TEMPLATE,
};
