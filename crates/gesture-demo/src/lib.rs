//! Gesture Recognition Demo
//!
//! Wires configuration, logging, the selected backend and the input image
//! into a single demo run.

use std::borrow::Cow;
use std::str::FromStr;

use anyhow::{Context, Result};
use gesture::image_prep::{quantize_image, reconstruct_image};
use gesture::{run_demo, BackendKind, DemoConfig, DemoOutcome, TracingSink, INPUT_DIMS, TEST_IMAGE};
use inference_engine::{MockBackend, SystemMemory, TractBackend};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging(level: &str) -> Result<()> {
    let level = Level::from_str(level).with_context(|| format!("Invalid log level '{}'", level))?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Quantized input: the embedded test image unless a file is configured
pub fn load_input(config: &DemoConfig) -> Result<Cow<'static, [i8]>> {
    match &config.input_image {
        Some(path) => {
            info!("Quantizing input image {}", path.display());
            let data = quantize_image(path)
                .with_context(|| format!("Failed to prepare {}", path.display()))?;
            Ok(Cow::Owned(data))
        }
        None => Ok(Cow::Borrowed(&TEST_IMAGE[..])),
    }
}

/// Run the demo once with the configured backend
pub fn run(config: &DemoConfig) -> Result<DemoOutcome> {
    let input = load_input(config)?;

    if let Some(path) = &config.dump_input {
        reconstruct_image(&input)?
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Input image written to {}", path.display());
    }

    let settings = config.settings(&input);
    let mut sink = TracingSink;

    let outcome = match config.backend {
        BackendKind::Tract => {
            let backend = TractBackend::new(config.storage.clone(), &INPUT_DIMS);
            run_demo(&backend, &SystemMemory, &settings, &mut sink)
        }
        BackendKind::Mock => {
            let backend = MockBackend::new(config.mock_scores.clone(), config.mock_exponent)
                .with_input_name(&config.input_name);
            run_demo(&backend, &SystemMemory, &settings, &mut sink)
        }
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesture::{DemoError, Gesture};
    use inference_engine::StorageConfig;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Log writer appending to a shared buffer
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn mock_config() -> DemoConfig {
        DemoConfig {
            backend: BackendKind::Mock,
            ..Default::default()
        }
    }

    #[test]
    fn test_embedded_input_is_borrowed() {
        let input = load_input(&DemoConfig::default()).unwrap();
        assert!(matches!(input, Cow::Borrowed(_)));
        assert_eq!(input.len(), TEST_IMAGE.len());
    }

    #[test]
    fn test_mock_run_completes() {
        let outcome = run(&mock_config()).unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.best().unwrap().gesture, Gesture::Palm);
    }

    #[test]
    fn test_missing_model_aborts_cleanly() {
        let dir = std::env::temp_dir().join(format!("gesture-demo-empty-{}", std::process::id()));
        let config = DemoConfig {
            storage: StorageConfig {
                partition_dir: dir.clone(),
                sdcard_dir: dir,
            },
            ..Default::default()
        };

        let outcome = run(&config).unwrap();
        assert!(matches!(outcome.error(), Some(DemoError::ModelLoad(_))));
    }

    #[test]
    fn test_corrupt_model_logs_one_error() {
        let dir = std::env::temp_dir().join(format!("gesture-demo-corrupt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("model.onnx"), b"garbage").unwrap();
        let config = DemoConfig {
            storage: StorageConfig {
                partition_dir: dir.clone(),
                sdcard_dir: dir,
            },
            ..Default::default()
        };

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let outcome = tracing::subscriber::with_default(subscriber, || run(&config).unwrap());

        assert!(matches!(outcome.error(), Some(DemoError::ModelLoad(_))));
        let errors: Vec<String> = log
            .lines()
            .into_iter()
            .filter(|line| line.contains("ERROR"))
            .collect();
        assert_eq!(errors.len(), 1, "error lines: {:?}", errors);
        assert!(errors[0].contains("gesture::events"));
    }

    #[test]
    fn test_dump_input_writes_png() {
        let path = std::env::temp_dir().join(format!("gesture-demo-input-{}.png", std::process::id()));
        let config = DemoConfig {
            dump_input: Some(path.clone()),
            ..mock_config()
        };

        run(&config).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_invalid_log_level() {
        assert!(init_logging("loud").is_err());
    }
}
