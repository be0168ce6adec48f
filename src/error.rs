//! Error types and exit codes for repodistill

use std::process::ExitCode;
use thiserror::Error;

/// Main error type for repodistill operations.
///
/// Per-file problems (unreadable files, oversized documents, syntax errors,
/// unknown formats) are policy degradations handled inside the walker and
/// never surface here. Only configuration-level failures are fatal.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Not a directory: {path}")]
    InvalidRoot { path: String },

    #[error("Invalid worker pool size: {size}")]
    InvalidPoolSize { size: usize },

    #[error("Failed to convert {format} document: {message}")]
    ConversionFailed {
        format: &'static str,
        message: String,
    },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Convert error to an exit code:
    /// - 1: IO error
    /// - 2: invalid root directory
    /// - 3: invalid pool size
    /// - 4: conversion or cache failure
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) => ExitCode::from(1),
            Self::InvalidRoot { .. } => ExitCode::from(2),
            Self::InvalidPoolSize { .. } => ExitCode::from(3),
            Self::ConversionFailed { .. } => ExitCode::from(4),
            Self::Cache { .. } => ExitCode::from(4),
        }
    }
}

/// Result type alias for repodistill operations
pub type Result<T> = std::result::Result<T, ExtractError>;
