// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reading question results out of review-page markup.

pub mod extractor;
pub mod profile;
pub mod record;

pub use extractor::{count_entries, extract_record, AnchorError};
pub use profile::{CompiledProfile, ProfileError, SelectorProfile};
pub use record::{AnswerResult, Record, COLUMNS, OPTION_SEPARATOR, UNANSWERED_SENTINEL};
