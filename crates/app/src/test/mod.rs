//! Test Support


pub(crate) use context::TestContext;
