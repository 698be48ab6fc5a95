// src/converters/render.rs
use crate::config::RendererConfig;
use crate::utils::error::ConvertError;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use url::Url;

/// Prints an HTML file to PDF with a headless browser.
///
/// The browser gets an absolute `file://` URI for the input; the parent
/// directories of `output` are created first. Returns the output path.
pub async fn render_html_to_pdf(
    config: &RendererConfig,
    input: &Path,
    output: &Path,
) -> Result<PathBuf, ConvertError> {
    let input = input.canonicalize().map_err(|e| {
        ConvertError::Render(format!("cannot open input {}: {}", input.display(), e))
    })?;
    let uri = Url::from_file_path(&input).map_err(|_| {
        ConvertError::Render(format!("cannot build file URI for {}", input.display()))
    })?;

    let output = absolute(output)?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConvertError::Render(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }

    tracing::info!("Rendering {} to {} with {}", uri, output.display(), config.binary);

    let result = Command::new(&config.binary)
        .args(&config.args)
        .arg(format!("--print-to-pdf={}", output.display()))
        .arg(uri.as_str())
        .output()
        .await
        .map_err(|e| ConvertError::Render(format!("failed to launch {}: {}", config.binary, e)))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        tracing::error!("{} exited with {}", config.binary, result.status);
        return Err(ConvertError::Render(format!(
            "{} exited with {}: {}",
            config.binary,
            result.status,
            stderr.trim()
        )));
    }

    if !output.is_file() {
        return Err(ConvertError::Render(format!(
            "{} reported success but wrote no file at {}",
            config.binary,
            output.display()
        )));
    }

    Ok(output)
}

fn absolute(path: &Path) -> Result<PathBuf, ConvertError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| ConvertError::Render(format!("cannot resolve working directory: {}", e)))?;
    Ok(cwd.join(path))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Stands in for a browser: writes a stub PDF wherever --print-to-pdf points.
    fn fake_renderer(dir: &Path) -> RendererConfig {
        let script = dir.join("fake-browser.sh");
        std::fs::write(
            &script,
            "for a in \"$@\"; do\n  case \"$a\" in\n    --print-to-pdf=*) printf '%%PDF-1.4\\n' > \"${a#--print-to-pdf=}\" ;;\n  esac\ndone\n",
        )
        .unwrap();
        RendererConfig {
            binary: "sh".to_string(),
            args: vec![script.display().to_string()],
        }
    }

    #[tokio::test]
    async fn test_renders_into_nested_output() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("filing.htm");
        std::fs::write(&input, "<html><body>hello</body></html>").unwrap();
        let output = tmp.path().join("pdf").join("filing.pdf");

        let config = fake_renderer(tmp.path());
        let written = render_html_to_pdf(&config, &input, &output).await.unwrap();

        assert_eq!(written, output);
        assert!(std::fs::read(&output).unwrap().starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let tmp = tempdir().unwrap();
        let config = fake_renderer(tmp.path());
        let err = render_html_to_pdf(&config, &tmp.path().join("absent.htm"), &tmp.path().join("o.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Render(ref msg) if msg.contains("absent.htm")));
    }

    #[tokio::test]
    async fn test_renderer_failures_are_render_errors() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("filing.htm");
        std::fs::write(&input, "<html></html>").unwrap();
        let output = tmp.path().join("filing.pdf");

        let failing = RendererConfig::default().with_binary("false");
        let err = render_html_to_pdf(&failing, &input, &output).await.unwrap_err();
        assert!(matches!(err, ConvertError::Render(_)));

        let missing = RendererConfig::default().with_binary("/nonexistent/browser-binary");
        let err = render_html_to_pdf(&missing, &input, &output).await.unwrap_err();
        assert!(matches!(err, ConvertError::Render(ref msg) if msg.contains("failed to launch")));
    }
}
