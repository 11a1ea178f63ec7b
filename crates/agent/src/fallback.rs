//! Canned replies used when the generative service is unavailable

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const PRICING_REPLY: &str = "Nira will operate on a freemium model with affordable subscription tiers for individual clinicians. Organization plans will soon be available. Sign up for our waitlist to be the first to know about pricing!";

pub const SECURITY_REPLY: &str = "Ron AI is building Nira with a security-first mindset. Our initial product is designed to work with de-identified data to ensure zero risk, and our long-term roadmap includes full HIPAA compliance and SOC 2 certification for our enterprise partners.";

pub const DEMO_REPLY: &str = "I'd love to show you what Nira can do! We're currently in development and building our waitlist. Would you like to request early access? This will give you priority access when we launch.";

pub const GREETING_REPLY: &str = "Hello! I'm Ron AI's assistant. Nira is our revolutionary healthcare AI platform that helps clinicians automate administrative tasks and focus on patient care. How can I help you learn more about Nira today?";

pub const FEATURES_REPLY: &str = "Nira specializes in automating prior authorizations, insurance verifications, and clinical documentation. Our AI agents work 24/7 to handle tedious administrative tasks, freeing up healthcare professionals to focus on what matters most - patient care. Would you like to learn more about a specific feature?";

/// Generic call-to-action replies for messages no bucket matches
pub const GENERIC_REPLIES: [&str; 3] = [
    "That's a great question! Nira is designed to streamline healthcare workflows and reduce administrative burden. Would you like to request early access to be among the first to experience our platform?",
    "I understand you're interested in Nira's capabilities. Our AI-powered platform helps automate administrative tasks, allowing healthcare professionals to focus on patient care. Can I help you with any specific questions?",
    "Thanks for your interest in Nira! Our platform integrates with existing healthcare systems to automate workflows and improve operational efficiency. Would you like to join our waitlist for early access?",
];

/// Keyword buckets, checked in order by substring
const BUCKETS: &[(&[&str], &str)] = &[
    (&["pricing", "cost", "price"], PRICING_REPLY),
    (&["security", "hipaa", "compliance"], SECURITY_REPLY),
    (&["demo", "try", "test"], DEMO_REPLY),
    (&["hello", "hi", "hey"], GREETING_REPLY),
    (&["features", "what", "does", "can"], FEATURES_REPLY),
];

/// Keyword-bucketed canned replies
///
/// Only the generic pick is random. The RNG is injectable so tests can seed it.
pub struct FallbackBank {
    rng: Mutex<StdRng>,
}

impl Default for FallbackBank {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackBank {
    /// Bank with an entropy-seeded RNG
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Bank with a fixed seed, for reproducible generic picks
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Reply for `message`. Never empty.
    pub fn fallback(&self, message: &str) -> &'static str {
        let lowered = message.to_lowercase();

        BUCKETS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(_, reply)| *reply)
            .unwrap_or_else(|| self.generic())
    }

    fn generic(&self) -> &'static str {
        let index = self.rng.lock().gen_range(0..GENERIC_REPLIES.len());
        GENERIC_REPLIES[index]
    }
}
