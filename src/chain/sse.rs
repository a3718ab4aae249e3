use std::io::BufRead;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SseError {
    #[error("invalid JSON in event payload: {0}")]
    InvalidJson(String),
    #[error("event payload is not a JSON object")]
    UnexpectedPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RiskEvent {
    Progress(Value),
    Completed { risk_score: Option<f64> },
    Done,
}

/// Line-buffered decoder for `data: <json>` event streams.
///
/// Chunks may split lines anywhere; the unterminated tail is kept until the
/// next chunk or [`SseDecoder::finish`]. Once a terminal event is seen all
/// further input is ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    partial: String,
    finished: bool,
}

impl SseDecoder {
    pub fn feed(&mut self, chunk: &str) -> Vec<Result<RiskEvent, SseError>> {
        self.partial.push_str(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.partial.find('\n') {
            let line = self.partial[..newline].trim_end_matches('\r').to_string();
            self.partial.drain(..=newline);
            if let Some(event) = self.decode_line(&line) {
                events.push(event);
            }
        }
        events
    }

    pub fn finish(&mut self) -> Vec<Result<RiskEvent, SseError>> {
        let line = std::mem::take(&mut self.partial);
        let line = line.trim_end_matches('\r');
        self.decode_line(line).into_iter().collect()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn decode_line(&mut self, line: &str) -> Option<Result<RiskEvent, SseError>> {
        if self.finished {
            return None;
        }

        let payload = line.strip_prefix(DATA_PREFIX)?.trim();
        if payload.is_empty() {
            return None;
        }

        if payload == DONE_SENTINEL {
            self.finished = true;
            return Some(Ok(RiskEvent::Done));
        }

        let parsed = match serde_json::from_str::<Value>(payload) {
            Ok(parsed) => parsed,
            Err(error) => return Some(Err(SseError::InvalidJson(error.to_string()))),
        };

        let Value::Object(object) = parsed else {
            return Some(Err(SseError::UnexpectedPayload));
        };

        if let Some(result) = object.get("analysis_result") {
            self.finished = true;
            let risk_score = result
                .pointer("/threat_analysis/risk_score")
                .and_then(Value::as_f64);
            return Some(Ok(RiskEvent::Completed { risk_score }));
        }

        Some(Ok(RiskEvent::Progress(Value::Object(object))))
    }
}

fn apply_event(event: Result<RiskEvent, SseError>, risk_score: &mut Option<f64>) {
    match event {
        Ok(RiskEvent::Progress(progress)) => {
            let stage = progress.get("stage").and_then(Value::as_str).unwrap_or("-");
            debug!(stage, "risk analysis progress");
        }
        Ok(RiskEvent::Completed { risk_score: score }) => {
            *risk_score = score;
        }
        Ok(RiskEvent::Done) => {}
        Err(error) => {
            warn!(%error, "skipping malformed risk stream event");
        }
    }
}

/// Reads a risk-analysis event stream to its terminal event and returns the
/// final score, if the stream produced one.
pub fn read_risk_score(mut reader: impl BufRead) -> Option<f64> {
    let mut decoder = SseDecoder::default();
    let mut risk_score = None;
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                // Undecodable bytes only spoil their own event.
                for event in decoder.feed(&String::from_utf8_lossy(&line)) {
                    apply_event(event, &mut risk_score);
                }
                if decoder.is_finished() {
                    return risk_score;
                }
            }
            Err(error) => {
                warn!(%error, "risk stream read failed");
                break;
            }
        }
    }

    for event in decoder.finish() {
        apply_event(event, &mut risk_score);
    }
    risk_score
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reassembles_lines_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed("data: {\"stage\":").is_empty());
        let events = decoder.feed(" \"fetch\"}\r\ndata: [DO");
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Ok(RiskEvent::Progress(value)) if value["stage"] == "fetch"));

        let events = decoder.feed("NE]\n");
        assert_eq!(events, vec![Ok(RiskEvent::Done)]);
        assert!(decoder.is_finished());
    }

    #[test]
    fn ignores_non_data_lines_and_blank_payloads() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed("event: progress\n: comment\n\ndata:\n");
        assert!(events.is_empty());
    }

    #[test]
    fn reports_malformed_events_and_keeps_going() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed("data: {\"stage\": \"a\",}\ndata: [1, 2]\ndata: {\"stage\": \"b\"}\n");
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Err(SseError::InvalidJson(_))));
        assert_eq!(events[1], Err(SseError::UnexpectedPayload));
        assert!(matches!(events[2], Ok(RiskEvent::Progress(_))));
        assert!(!decoder.is_finished());
    }

    #[test]
    fn analysis_result_terminates_the_stream() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(
            "data: {\"analysis_result\": {\"threat_analysis\": {\"risk_score\": 72.5}}}\ndata: {\"stage\": \"late\"}\n",
        );
        assert_eq!(
            events,
            vec![Ok(RiskEvent::Completed {
                risk_score: Some(72.5)
            })]
        );
    }

    #[test]
    fn unterminated_final_line_is_decoded_on_finish() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed("data: [DONE]").is_empty());
        assert_eq!(decoder.finish(), vec![Ok(RiskEvent::Done)]);
    }

    #[test]
    fn reader_returns_final_score() {
        let stream = "data: {\"stage\": \"start\"}\n\
                      data: {broken,}\n\
                      data: {\"analysis_result\": {\"threat_analysis\": {\"risk_score\": 41}}}\n\
                      data: [DONE]\n";
        assert_eq!(read_risk_score(Cursor::new(stream)), Some(41.0));
    }

    #[test]
    fn invalid_utf8_line_does_not_end_the_stream() {
        let mut stream = b"data: {\"stage\":\"a".to_vec();
        stream.push(0xff);
        stream.extend_from_slice(
            b"\"}\ndata: {\"analysis_result\": {\"threat_analysis\": {\"risk_score\": 41}}}\n",
        );
        assert_eq!(read_risk_score(Cursor::new(stream)), Some(41.0));
    }

    #[test]
    fn reader_without_result_yields_none() {
        let stream = "data: {\"stage\": \"start\"}\ndata: [DONE]\n";
        assert_eq!(read_risk_score(Cursor::new(stream)), None);
        assert_eq!(read_risk_score(Cursor::new("")), None);
    }

    #[test]
    fn result_without_score_yields_none() {
        let stream = "data: {\"analysis_result\": {\"summary\": \"ok\"}}";
        assert_eq!(read_risk_score(Cursor::new(stream)), None);
    }
}
