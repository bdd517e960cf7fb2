//! Relay to the multimodal completion provider.
//!
//! One request, one response: the photo goes out as a base64 data URL next
//! to a fixed instruction template whose headings the extractor depends on.
//! No retries; every failure is terminal for the request.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;

use crate::server::error::AnalyzeError;

pub const MODEL: &str = "gpt-4.1";
pub const MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = "You are an ancestry reading assistant for an \
entertainment app. Given a face photo you produce a playful, clearly \
non-scientific ancestry estimate. Always follow the exact report structure \
requested by the user message, and start the report with: Here is a \
breakdown of the observed traits and the ancestry inferences that can be \
drawn:";

const USER_PROMPT: &str = "Structure your report exactly as shown below, using \
the same headings, section order, and markdown formatting. Replace all \
bracketed placeholders with your analysis of the given photo. Do not add \
extra sections.\n\n\
Here is a breakdown of the observed traits and the ancestry inferences that \
can be drawn:\n\n\
**Facial and Cranial Analysis:**\n\n\
- **Skin Pigmentation:** [observation and inference]\n\n\
- **Cranial Structure:** [observation and inference]\n\n\
- **Jaw & Cheekbone Structure:** [observation and inference]\n\n\
- **Eye Shape and Tilt:** [observation and inference]\n\n\
- **Nasal Bridge and Nostrils:** [observation and inference]\n\n\
- **Lip Form:** [observation and inference]\n\n\
**Genetic and Historical Inference:**\n\n\
- **Ethnic & Regional Correlation:** [observation and inference]\n\n\
- **Migratory Routes & Admixture:** [observation and inference]\n\n\
**Comprehensive Ancestry Percentage Breakdown:**\n\n\
For each detected ancestry region or group, output a bullet in this format:\n\
- **[Region/Group Name]:** [Percentage]%\n    - [Key traits/justification]\n\
Repeat for as many regions or groups as are detected.\n\n\
---\n\n\
### SUMMARY TABLE\n\n\
| Region/Group | Estimated Percentage | Key Traits & Justification |\n\
|--------------|---------------------|---------------------------|\n\
| [Region/Group 1] | [Percentage]% | [Key traits/justification] |\n\
| [Region/Group 2] | [Percentage]% | [Key traits/justification] |\n\
| [Region/Group 3] | [Percentage]% | [Key traits/justification] |\n\n\
**Conclusion:**\n[Concise summary referencing the regions, percentages, and \
key traits detected.]\n";

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ProviderClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Send the photo for analysis and return the raw completion text.
    pub async fn analyze_image(&self, image: &[u8], mime: &str) -> Result<String, AnalyzeError> {
        let data_url = format!("data:{mime};base64,{}", BASE64.encode(image));
        let body = json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": USER_PROMPT },
                        {
                            "type": "image_url",
                            "image_url": { "url": data_url, "detail": "high" }
                        },
                    ],
                },
            ],
            "max_tokens": MAX_TOKENS,
        });

        info!("relaying {} byte {mime} image to {MODEL}", image.len());
        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalyzeError::Internal(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::Upstream(format!("{status}: {body}")));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|_| AnalyzeError::EmptyResult)?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AnalyzeError::EmptyResult);
        }
        debug!("provider returned {} chars", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_the_section_triggers() {
        // The extractor keys off these phrases; the prompt must request them.
        let lower = USER_PROMPT.to_lowercase();
        assert!(lower.contains("comprehensive ancestry percentage"));
        assert!(lower.contains("summary table"));
        assert!(lower.contains("conclusion"));
    }

    #[test]
    fn completion_shape_deserializes() {
        let raw = r#"{"choices":[{"message":{"content":"hello"}}]}"#;
        let parsed: ChatCompletion = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hello"));
    }
}
