use crate::core::common::PipelineOptions;
use crate::core::konst::MAX_RESOLVER_WORKERS;
use crate::pipeline::error::PipelineError;

/// Validate the run configuration before any shared state or output exists.
pub fn validate_pipeline_options(options: &PipelineOptions, source_count: usize) -> Result<(), PipelineError> {
    if source_count > options.max_sources {
        return Err(PipelineError::TooManySources {
            count: source_count,
            max: options.max_sources,
        });
    }
    if options.resolvers == 0 || options.resolvers > MAX_RESOLVER_WORKERS {
        return Err(PipelineError::InvalidConfig(format!(
            "resolver count must be between 1 and {MAX_RESOLVER_WORKERS}, got {}",
            options.resolvers
        )));
    }
    if options.queue_capacity == 0 {
        return Err(PipelineError::InvalidConfig(
            "queue capacity must be at least 1".to_owned(),
        ));
    }
    Ok(())
}

/// Whether a scanned token fits the hostname length limit.
pub fn validate_hostname_length(token: &str, max: usize) -> bool {
    !token.is_empty() && token.len() <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_with_one_source_pass() {
        assert!(validate_pipeline_options(&PipelineOptions::default(), 1).is_ok());
    }

    #[test]
    fn max_sources_is_allowed() {
        assert!(validate_pipeline_options(&PipelineOptions::default(), 10).is_ok());
    }

    #[test]
    fn too_many_sources_fails() {
        let err = validate_pipeline_options(&PipelineOptions::default(), 11).unwrap_err();
        assert!(matches!(err, PipelineError::TooManySources { count: 11, max: 10 }));
        assert_eq!(err.to_string(), "Too many input files: 11 [MAX=10]");
    }

    #[test]
    fn zero_resolvers_fails() {
        let options = PipelineOptions {
            resolvers: 0,
            ..Default::default()
        };
        assert!(matches!(
            validate_pipeline_options(&options, 1),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn too_many_resolvers_fails() {
        let options = PipelineOptions {
            resolvers: MAX_RESOLVER_WORKERS + 1,
            ..Default::default()
        };
        assert!(validate_pipeline_options(&options, 1).is_err());
    }

    #[test]
    fn zero_capacity_fails() {
        let options = PipelineOptions {
            queue_capacity: 0,
            ..Default::default()
        };
        assert!(validate_pipeline_options(&options, 1).is_err());
    }

    #[test]
    fn hostname_length_limit() {
        assert!(validate_hostname_length("a.test", 1024));
        assert!(validate_hostname_length(&"a".repeat(1024), 1024));
        assert!(!validate_hostname_length(&"a".repeat(1025), 1024));
        assert!(!validate_hostname_length("", 1024));
    }
}
