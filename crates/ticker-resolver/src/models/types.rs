use std::borrow::Cow;

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// Canonical listing identifier, e.g. "600000" or "00700.HK"
pub type Identifier = String;
