#![allow(missing_docs)]

pub(crate) mod fixtures;
pub(crate) mod http;

pub(crate) use fixtures::{get_expense_state, get_test_session};
pub(crate) use http::{assert_content_type, assert_message, assert_status, parse_json_body};
