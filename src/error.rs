use crate::{ioc::IocError, itools::ItoolsError, readings::ReadingsError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(r#"source format "{0}" is not recognized, expected "ioc" or "itools""#)]
    Source(String),
    #[error("Error in the `ioc` module")]
    Ioc(#[from] IocError),
    #[error("Error in the `itools` module")]
    Itools(#[from] ItoolsError),
    #[error("Error in the `readings` module")]
    Readings(#[from] ReadingsError),
}

#[cfg(test)]
mod tests {
    #[test]
    fn invalid_source() {
        let err = crate::load("csv", "data.csv").unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"source format "csv" is not recognized, expected "ioc" or "itools""#
        );
    }
}
