//! Use-case services over repositories.

pub mod onboarding_service;
