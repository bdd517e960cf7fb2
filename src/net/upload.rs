//! Client-side upload to the analyze endpoint.
//!
//! Blocking multipart POST, run on a worker thread by the app shell. Bytes
//! written through the multipart reader are reported via a callback so the
//! UI can map them onto the 0–40% band of the progress model.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::server::routes::AnalyzeResponse;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not read photo: {0}")]
    Io(#[from] std::io::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server rejected the photo ({status}): {body}")]
    Status { status: u16, body: String },
}

/// Counts bytes as the multipart body drains them from the file.
struct ProgressReader<R, F> {
    inner: R,
    sent: u64,
    notify: F,
}

impl<R: Read, F: FnMut(u64)> Read for ProgressReader<R, F> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.sent += n as u64;
            (self.notify)(self.sent);
        }
        Ok(n)
    }
}

/// Upload `photo` to the endpoint and return the parsed response. Blocks;
/// `on_sent` receives cumulative bytes written out of `total`.
pub fn send_photo(
    endpoint: &str,
    photo: &Path,
    on_sent: impl FnMut(u64) + Send + 'static,
) -> Result<AnalyzeResponse, UploadError> {
    let file = File::open(photo)?;
    let total = file.metadata()?.len();
    let file_name = photo
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());

    debug!("uploading {file_name} ({total} bytes) to {endpoint}");

    let reader = ProgressReader {
        inner: file,
        sent: 0,
        notify: on_sent,
    };
    let part = reqwest::blocking::multipart::Part::reader_with_length(reader, total)
        .file_name(file_name)
        .mime_str("application/octet-stream")?;
    let form = reqwest::blocking::multipart::Form::new().part("file", part);

    let response = reqwest::blocking::Client::new()
        .post(endpoint)
        .multipart(form)
        .send()?;

    let status = response.status();
    if status.as_u16() != 200 {
        let body = response.text().unwrap_or_default();
        return Err(UploadError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<AnalyzeResponse>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_reader_reports_cumulative_bytes() {
        let data = vec![7u8; 1000];
        let mut seen = Vec::new();
        let mut reader = ProgressReader {
            inner: &data[..],
            sent: 0,
            notify: |sent| seen.push(sent),
        };
        let mut buf = [0u8; 256];
        while reader.read(&mut buf).unwrap() > 0 {}
        assert_eq!(*seen.last().unwrap(), 1000);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }
}
