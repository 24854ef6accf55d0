use anyhow::{Context, Result, bail};
use hmac::{Hmac, Mac};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_API_BASE: &str = "https://api.mercadopago.com";

#[derive(Debug, Clone)]
pub struct MercadoPagoConfig {
    pub access_token: String,
    pub webhook_secret: String,
    pub notification_url: Option<String>,
    pub success_url: String,
    pub failure_url: String,
    pub pending_url: String,
}

/// Minimal Mercado Pago client built on reqwest.
pub struct MercadoPagoClient {
    http: reqwest::Client,
    api_base: String,
    config: MercadoPagoConfig,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    pub quantity: i32,
    /// Whole COP.
    pub unit_price: i64,
    pub currency_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceRequest {
    pub external_reference: String,
    pub items: Vec<PreferenceItem>,
    pub payer_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Preference {
    pub id: String,
    pub init_point: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MercadoPagoPayment {
    pub id: i64,
    pub status: String,
    pub status_detail: Option<String>,
    pub external_reference: Option<String>,
    pub transaction_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MercadoPagoErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct PreferenceBody<'a> {
    items: &'a [PreferenceItem],
    external_reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    payer: Option<PayerBody<'a>>,
    back_urls: BackUrls<'a>,
    auto_return: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_url: Option<&'a str>,
}

#[derive(Serialize)]
struct PayerBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct BackUrls<'a> {
    success: &'a str,
    failure: &'a str,
    pending: &'a str,
}

impl MercadoPagoClient {
    pub fn new(config: MercadoPagoConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            config,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (mp_error, mp_message) = match serde_json::from_str::<MercadoPagoErrorBody>(&body) {
            Ok(parsed) => (parsed.error, parsed.message),
            Err(_) => (None, None),
        };

        error!(
            status = %status,
            mp_request_id = ?request_id,
            mp_error = ?mp_error,
            mp_message = ?mp_message,
            response_body = %body,
            context = %context,
            "mercadopago api request failed"
        );

        bail!(
            "Mercado Pago API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    /// Checkout Pro preference. https://www.mercadopago.com.co/developers/en/reference/preferences/_checkout_preferences/post
    pub async fn create_preference(&self, request: &PreferenceRequest) -> Result<Preference> {
        let body = PreferenceBody {
            items: &request.items,
            external_reference: &request.external_reference,
            payer: request
                .payer_email
                .as_deref()
                .map(|email| PayerBody { email }),
            back_urls: BackUrls {
                success: &self.config.success_url,
                failure: &self.config.failure_url,
                pending: &self.config.pending_url,
            },
            auto_return: "approved",
            notification_url: self.config.notification_url.as_deref(),
        };

        let resp = self
            .http
            .post(format!("{}/checkout/preferences", self.api_base))
            .header(AUTHORIZATION, format!("Bearer {}", self.config.access_token))
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create preference").await?;

        let preference: Preference = resp.json().await.context("invalid preference response")?;
        Ok(preference)
    }

    pub async fn get_payment(&self, payment_id: &str) -> Result<MercadoPagoPayment> {
        let resp = self
            .http
            .get(format!("{}/v1/payments/{}", self.api_base, payment_id))
            .header(AUTHORIZATION, format!("Bearer {}", self.config.access_token))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "get payment").await?;

        let payment: MercadoPagoPayment = resp.json().await.context("invalid payment response")?;
        Ok(payment)
    }

    /// Verifies the `x-signature` header of a webhook notification.
    /// https://www.mercadopago.com.co/developers/en/docs/your-integrations/notifications/webhooks
    pub fn verify_webhook_signature(
        &self,
        signature_header: &str,
        request_id: &str,
        data_id: &str,
    ) -> Result<()> {
        verify_signature(&self.config.webhook_secret, signature_header, request_id, data_id)
    }
}

pub fn signature_manifest(data_id: &str, request_id: &str, ts: &str) -> String {
    format!("id:{};request-id:{};ts:{};", data_id.to_lowercase(), request_id, ts)
}

pub fn verify_signature(
    secret: &str,
    signature_header: &str,
    request_id: &str,
    data_id: &str,
) -> Result<()> {
    if secret.is_empty() {
        bail!("webhook secret is not configured");
    }

    let mut timestamp: Option<&str> = None;
    let mut signature: Option<&str> = None;

    for part in signature_header.split(',') {
        let part = part.trim();
        if let Some(rest) = part.strip_prefix("ts=") {
            timestamp = Some(rest);
        } else if let Some(rest) = part.strip_prefix("v1=") {
            signature = Some(rest);
        }
    }

    let timestamp = timestamp.ok_or_else(|| anyhow::anyhow!("missing ts in x-signature"))?;
    let signature = signature.ok_or_else(|| anyhow::anyhow!("missing v1 in x-signature"))?;

    let manifest = signature_manifest(data_id, request_id, timestamp);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(manifest.as_bytes());
    let provided = hex::decode(signature).context("x-signature v1 is not hex")?;

    mac.verify_slice(&provided)
        .map_err(|_| anyhow::anyhow!("invalid webhook signature"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, manifest: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(manifest.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_a_correctly_signed_notification() {
        let manifest = signature_manifest("123456", "req-1", "1704908010");
        assert_eq!(manifest, "id:123456;request-id:req-1;ts:1704908010;");

        let header = format!("ts=1704908010,v1={}", sign("topsecret", &manifest));
        assert!(verify_signature("topsecret", &header, "req-1", "123456").is_ok());
    }

    #[test]
    fn rejects_tampered_or_malformed_signatures() {
        let manifest = signature_manifest("123456", "req-1", "1704908010");
        let header = format!("ts=1704908010,v1={}", sign("topsecret", &manifest));

        assert!(verify_signature("topsecret", &header, "req-1", "999999").is_err());
        assert!(verify_signature("othersecret", &header, "req-1", "123456").is_err());
        assert!(verify_signature("topsecret", "v1=abcd", "req-1", "123456").is_err());
        assert!(verify_signature("topsecret", "ts=1,v1=zz", "req-1", "123456").is_err());
    }

    #[test]
    fn unconfigured_secret_rejects_every_signature() {
        let manifest = signature_manifest("123456", "attacker", "1");
        let header = format!("ts=1,v1={}", sign("", &manifest));

        let err = verify_signature("", &header, "attacker", "123456").unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
