//! Voice-response documents for the telephony platform
//!
//! Builds the TwiML-style XML the IVR fetches: a `<Say>` with the spoken rate
//! followed by a `<Redirect>` back into the call flow. The success and
//! apology documents share that shape and differ only in the spoken text.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::data::{ExchangeQuote, SpokenTimestamp};

/// Amazon Polly voice used for the Spanish announcement
pub const DEFAULT_VOICE: &str = "Polly.Andres-Neural";

/// Language tag for the announcement
pub const DEFAULT_LANGUAGE: &str = "es-MX";

/// Spoken when no quote could be retrieved
pub const APOLOGY_MESSAGE: &str =
    "Sorry, we could not retrieve the current exchange rate. Please try again later.";

/// Query string appended to the webhook so the flow resumes after the message
const RETURN_QUERY: &str = "?FlowEvent=return";

/// Errors that can occur while writing a document
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Failed to write XML: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A complete XML document ready to serve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceDocument(String);

impl VoiceDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Voice configuration and redirect target shared by every document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSettings {
    /// `voice` attribute of `<Say>`
    pub voice: String,
    /// `language` attribute of `<Say>`
    pub language: String,
    /// Base URL of the call-flow webhook; `None` leaves only the query string
    pub webhook_url: Option<String>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice: DEFAULT_VOICE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            webhook_url: None,
        }
    }
}

impl VoiceSettings {
    /// Text content of `<Redirect>`
    pub fn redirect_url(&self) -> String {
        format!("{}{}", self.webhook_url.as_deref().unwrap_or_default(), RETURN_QUERY)
    }
}

/// Renders success and apology documents
///
/// The apology document never changes, so it is rendered once up front and
/// handed out by clone.
#[derive(Debug, Clone)]
pub struct VoiceBuilder {
    settings: VoiceSettings,
    apology: VoiceDocument,
}

impl VoiceBuilder {
    pub fn new(settings: VoiceSettings) -> Result<Self, VoiceError> {
        let apology = render(&settings, APOLOGY_MESSAGE)?;
        Ok(Self { settings, apology })
    }

    /// Document announcing the given quote
    pub fn success(
        &self,
        quote: &ExchangeQuote,
        spoken: &SpokenTimestamp,
    ) -> Result<VoiceDocument, VoiceError> {
        render(&self.settings, &spoken_summary(quote, spoken))
    }

    /// Document apologizing that no quote is available
    pub fn failure(&self) -> VoiceDocument {
        self.apology.clone()
    }
}

/// The sentence read to the caller for a successful quote
pub fn spoken_summary(quote: &ExchangeQuote, spoken: &SpokenTimestamp) -> String {
    format!(
        "{} pesos to buy. {} pesos to sell. Last update: {}.",
        quote.buy_price, quote.sell_price, spoken
    )
}

fn render(settings: &VoiceSettings, message: &str) -> Result<VoiceDocument, VoiceError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    writer.write_event(Event::Start(BytesStart::new("Response")))?;

    let mut say = BytesStart::new("Say");
    say.push_attribute(("voice", settings.voice.as_str()));
    say.push_attribute(("language", settings.language.as_str()));
    writer.write_event(Event::Start(say))?;
    writer.write_event(Event::Text(BytesText::new(message)))?;
    writer.write_event(Event::End(BytesEnd::new("Say")))?;

    let mut redirect = BytesStart::new("Redirect");
    redirect.push_attribute(("method", "POST"));
    writer.write_event(Event::Start(redirect))?;
    writer.write_event(Event::Text(BytesText::new(&settings.redirect_url())))?;
    writer.write_event(Event::End(BytesEnd::new("Redirect")))?;

    writer.write_event(Event::End(BytesEnd::new("Response")))?;

    Ok(VoiceDocument(String::from_utf8(writer.into_inner())?))
}
