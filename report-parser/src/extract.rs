use thiserror::Error;

use crate::{junit::extractor::JunitExtraction, testng::extractor::TestNgExtraction};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("`{element}` element is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("no `{0}` element found")]
    ElementNotFound(&'static str),
}

/// Output of a format-specific extractor, ready for aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    JUnit(JunitExtraction),
    TestNg(TestNgExtraction),
}

pub(crate) mod parse_attr {
    use std::str::FromStr;

    use crate::{document::Element, options::ParseOptions};

    use super::ExtractionError;

    pub fn string(element: &Element, attr_name: &str, options: &ParseOptions) -> Option<String> {
        element.attr(attr_name).and_then(|value| options.text(value))
    }

    pub fn required(
        element: &Element,
        element_name: &'static str,
        attr_name: &'static str,
        options: &ParseOptions,
    ) -> Result<String, ExtractionError> {
        element
            .attr(attr_name)
            .map(|value| String::from(options.truncate(value)))
            .ok_or(ExtractionError::MissingAttribute {
                element: element_name,
                attribute: attr_name,
            })
    }

    /// Non-negative integer attribute, 0 when missing or not a number.
    pub fn count(element: &Element, attr_name: &str) -> usize {
        parse_into_other_type(element, attr_name).unwrap_or_default()
    }

    /// Non-negative, finite float attribute, 0.0 otherwise.
    pub fn seconds(element: &Element, attr_name: &str) -> f64 {
        parse_into_other_type::<f64>(element, attr_name)
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
            .unwrap_or_default()
    }

    pub fn millis_as_seconds(element: &Element, attr_name: &str) -> f64 {
        seconds(element, attr_name) / 1000.0
    }

    pub fn flag(element: &Element, attr_name: &str) -> bool {
        element
            .attr(attr_name)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    fn parse_into_other_type<T: FromStr>(element: &Element, attr_name: &str) -> Option<T> {
        element
            .attr(attr_name)
            .and_then(|value| value.trim().parse::<T>().ok())
    }
}
