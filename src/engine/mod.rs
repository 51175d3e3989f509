pub mod access;
pub mod lifecycle;
pub mod onboarding;
pub mod pricing;
