// Shared fixtures for integration tests

#![allow(dead_code)]

use nearby_scout::models::{Candidate, Coordinate, SearchQuery};
use nearby_scout::{PlaceProvider, ProviderError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub fn islamabad() -> Coordinate {
    Coordinate { latitude: 33.6844, longitude: 73.0479 }
}

/// A place answer: (lat, lon, name)
pub type Place = (f64, f64, String);

pub fn place(lat: f64, lon: f64, name: &str) -> Place {
    (lat, lon, name.to_string())
}

/// Evenly spaced places far enough apart never to collide
pub fn grid(count: usize, base_lat: f64, prefix: &str) -> Vec<Place> {
    (0..count)
        .map(|i| (base_lat + i as f64 * 0.001, 73.05, format!("{} {}", prefix, i)))
        .collect()
}

#[derive(Clone)]
enum Answer {
    Places(Vec<Place>),
    Fail,
    Hang,
}

/// Provider with scripted answers that records every query it receives
#[derive(Default)]
pub struct ScriptedProvider {
    category: Mutex<Vec<Answer>>,
    text: HashMap<String, Answer>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer for the next category query; later category queries reuse the last
    pub fn category(self, places: Vec<Place>) -> Self {
        self.category.lock().unwrap().push(Answer::Places(places));
        self
    }

    /// First category query hangs until cancelled or timed out
    pub fn category_hangs_once(self) -> Self {
        self.category.lock().unwrap().insert(0, Answer::Hang);
        self
    }

    pub fn category_fails(self) -> Self {
        self.category.lock().unwrap().push(Answer::Fail);
        self
    }

    pub fn text(mut self, term: &str, places: Vec<Place>) -> Self {
        self.text.insert(term.to_string(), Answer::Places(places));
        self
    }

    pub fn text_fails(mut self, term: &str) -> Self {
        self.text.insert(term.to_string(), Answer::Fail);
        self
    }

    pub fn text_hangs(mut self, term: &str) -> Self {
        self.text.insert(term.to_string(), Answer::Hang);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn text_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("text:").map(str::to_string))
            .collect()
    }

    fn next_category(&self) -> Answer {
        let mut answers = self.category.lock().unwrap();
        match answers.len() {
            0 => Answer::Places(vec![]),
            1 => answers[0].clone(),
            _ => answers.remove(0),
        }
    }

    async fn respond(answer: Answer, query: SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
        match answer {
            Answer::Places(places) => Ok(places
                .into_iter()
                .map(|(lat, lon, name)| Candidate {
                    coordinate: Coordinate { latitude: lat, longitude: lon },
                    name,
                    address: "Islamabad".to_string(),
                    source_query: query.clone(),
                })
                .collect()),
            Answer::Fail => Err(ProviderError::ApiError(503)),
            Answer::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(vec![])
            }
        }
    }
}

impl PlaceProvider for ScriptedProvider {
    async fn search_by_category(
        &self,
        categories: &[String],
        center: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.calls.lock().unwrap().push("category".to_string());
        let answer = self.next_category();
        Self::respond(answer, SearchQuery::category(categories.to_vec(), center, radius_meters, limit)).await
    }

    async fn search_by_text(
        &self,
        term: &str,
        center: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.calls.lock().unwrap().push(format!("text:{}", term));
        let answer = self.text.get(term).cloned().unwrap_or(Answer::Places(vec![]));
        Self::respond(answer, SearchQuery::text(term, center, radius_meters, limit)).await
    }
}
