use anyhow::Result;
use url::Url;

/// Validate a base URL and return it normalized with a trailing slash,
/// so relative paths like `api/transcript` resolve beneath it
pub fn validate_and_normalize_url(url: &str) -> Result<Url> {
    let mut parsed = Url::parse(url.trim())
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }

    Ok(parsed)
}

/// Origin of a URL (scheme, host and explicit port), as a browser scopes storage
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// File name used to hold the key/value area of one origin
pub fn storage_file_name(origin: &str) -> String {
    format!("{}.json", urlencoding::encode(origin))
}

/// Count words the way a whitespace split does: every whitespace run
/// separates two pieces, including empty pieces at either end
pub fn count_words(text: &str) -> usize {
    let mut pieces = 1;
    let mut in_whitespace = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                pieces += 1;
                in_whitespace = true;
            }
        } else {
            in_whitespace = false;
        }
    }

    pieces
}

/// Length in UTF-16 code units, matching what a browser reports for a string
pub fn count_chars(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Format a number with comma thousands separators
pub fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}
