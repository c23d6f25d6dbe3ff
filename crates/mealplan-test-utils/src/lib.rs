//! Shared test utilities for meal planner integration tests.
//!
//! Provides:
//! - JSON fixtures shaped like a Gemini meal plan response.
//! - [`ScriptedModel`]: a [`TextModel`] that replays canned responses and
//!   records the requests it received.
//! - [`RecordingDelivery`]: a [`Delivery`] that keeps sent emails in memory.
//! - [`spawn_rejecting_smtp_server`]: a minimal SMTP server on localhost
//!   that refuses every login with `535`.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use mealplan_core::delivery::{Delivery, DeliveryError, Email};
use mealplan_core::llm::{GenerationError, StructuredRequest, TextModel};
use mealplan_core::plan::Weekday;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn dish(name: &str, ingredients: &[(&str, &str)]) -> Value {
    let ingredients: Vec<Value> = ingredients
        .iter()
        .map(|(name, quantity)| json!({"name": name, "quantity": quantity}))
        .collect();
    json!({"name": name, "ingredients": ingredients})
}

/// A full week where Monday and Tuesday both start with Congee.
///
/// Monday: Congee [rice, water] / Stir-fry [veg, soy sauce].
/// Tuesday breakfast repeats Congee [rice, water]. Every other meal is a
/// distinct dish with a single ingredient.
pub fn sample_plan_value() -> Value {
    let congee = dish("Congee", &[("rice", "1 cup"), ("water", "6 cups")]);
    let mut week = serde_json::Map::new();
    for day in Weekday::ALL {
        let (breakfast, dinner) = match day {
            Weekday::Monday => (
                congee.clone(),
                dish("Stir-fry", &[("veg", "500g"), ("soy sauce", "2 tbsp")]),
            ),
            Weekday::Tuesday => (
                congee.clone(),
                dish("ABC Soup", &[("pork ribs", "500g")]),
            ),
            other => (
                dish(&format!("{other} Toast"), &[("bread", "8 slices")]),
                dish(&format!("{other} Lotus Root Soup"), &[("lotus root", "300g")]),
            ),
        };
        week.insert(
            day.to_string(),
            json!({"breakfast": breakfast, "dinner": dinner}),
        );
    }
    Value::Object(week)
}

pub fn sample_plan_json() -> String {
    sample_plan_value().to_string()
}

/// [`sample_plan_value`] with one day removed.
pub fn plan_json_without(day: Weekday) -> String {
    let mut value = sample_plan_value();
    if let Some(map) = value.as_object_mut() {
        map.remove(day.as_str());
    }
    value.to_string()
}

// ---------------------------------------------------------------------------
// Scripted model
// ---------------------------------------------------------------------------

/// A [`TextModel`] that returns queued responses in order.
///
/// Clones share the queue and the request log, so a test can keep one
/// clone for assertions while the agent owns the other.
#[derive(Clone, Default)]
pub struct ScriptedModel {
    responses: Arc<Mutex<VecDeque<Result<String, GenerationError>>>>,
    requests: Arc<Mutex<Vec<StructuredRequest>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body.
    pub fn respond(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    /// Queue a failure.
    pub fn fail(self, error: GenerationError) -> Self {
        self.push(Err(error))
    }

    fn push(self, item: Result<String, GenerationError>) -> Self {
        self.responses.lock().expect("responses lock").push_back(item);
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<StructuredRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &StructuredRequest) -> Result<String, GenerationError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or(Err(GenerationError::EmptyResponse))
    }
}

// ---------------------------------------------------------------------------
// Recording delivery
// ---------------------------------------------------------------------------

/// A [`Delivery`] that stores emails instead of sending them.
#[derive(Clone, Default)]
pub struct RecordingDelivery {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, email: &Email) -> Result<(), DeliveryError> {
        self.sent.lock().expect("sent lock").push(email.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fake SMTP server
// ---------------------------------------------------------------------------

/// Start a plain-text SMTP server on `127.0.0.1` that advertises
/// `AUTH PLAIN LOGIN` and answers every `AUTH` with `535`.
///
/// Serves connections on a background thread for the life of the test
/// process.
pub fn spawn_rejecting_smtp_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake SMTP server");
    let addr = listener.local_addr().expect("fake SMTP server address");

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            std::thread::spawn(move || {
                let _ = serve_rejecting_session(stream);
            });
        }
    });

    addr
}

fn serve_rejecting_session(stream: std::net::TcpStream) -> std::io::Result<()> {
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);
    writer.write_all(b"220 localhost ESMTP fake\r\n")?;

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let command = line.trim_end().to_ascii_uppercase();
        let reply: &[u8] = if command.starts_with("EHLO") {
            b"250-localhost\r\n250 AUTH PLAIN LOGIN\r\n"
        } else if command.starts_with("HELO") {
            b"250 localhost\r\n"
        } else if command.starts_with("AUTH") {
            b"535 5.7.8 Authentication credentials invalid\r\n"
        } else if command.starts_with("QUIT") {
            writer.write_all(b"221 bye\r\n")?;
            return Ok(());
        } else {
            b"503 5.5.1 Authentication required\r\n"
        };
        writer.write_all(reply)?;
    }
}
