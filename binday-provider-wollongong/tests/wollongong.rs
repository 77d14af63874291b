#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use binday_core::{
        clock::FixedClock,
        config::EngineConfig,
        model::{BinKind, LocalityId, MaterialBin, PropertyId, StreetId},
        ports::{ForecastPort, PortError, ReferencePort, SchedulePort},
    };
    use binday_provider_wollongong::{
        OpenMeteoForecastPort, WollongongReferencePort, WollongongSchedulePort, http_client,
    };
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // Helper to point the engine config at the mock server
    fn config(server: &MockServer) -> EngineConfig {
        EngineConfig {
            api_base: server.uri(),
            forecast_url: format!("{}/v1/forecast", server.uri()),
            request_timeout: Duration::from_millis(300),
            ..EngineConfig::default()
        }
    }

    fn clock() -> Arc<FixedClock> {
        let offset = FixedOffset::east_opt(11 * 3600).expect("valid offset");
        Arc::new(FixedClock(
            offset
                .with_ymd_and_hms(2026, 10, 19, 7, 0, 0)
                .single()
                .expect("unambiguous"),
        ))
    }

    fn reference(server: &MockServer) -> WollongongReferencePort {
        let config = config(server);
        WollongongReferencePort::new(http_client(&config).expect("client"), &config)
    }

    fn schedule_port(server: &MockServer) -> WollongongSchedulePort {
        let config = config(server);
        WollongongSchedulePort::new(http_client(&config).expect("client"), &config, clock())
    }

    fn day(dom: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, dom).expect("valid date")
    }

    #[tokio::test]
    async fn localities_are_unwrapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/localities.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localities": [{"id": 7, "name": "Thirroul"}, {"id": 3, "name": "Austinmer"}]
            })))
            .mount(&server)
            .await;

        let localities = reference(&server).localities().await.expect("localities");

        assert_eq!(localities.len(), 2);
        assert_eq!(localities.first().map(|locality| locality.id), Some(LocalityId(7)));
    }

    #[tokio::test]
    async fn streets_and_properties_inherit_parent_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/streets.json"))
            .and(query_param("locality", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "streets": [{"id": 70, "name": "Main Rd"}, {"id": 71, "name": "Beach St", "locality_id": 8}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/properties.json"))
            .and(query_param("street", "70"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": [{"id": 700, "name": "1"}]
            })))
            .mount(&server)
            .await;

        let port = reference(&server);
        let streets = port.streets(LocalityId(7)).await.expect("streets");
        let properties = port.properties(StreetId(70)).await.expect("properties");

        assert_eq!(
            streets.iter().map(|street| street.locality_id).collect::<Vec<_>>(),
            vec![LocalityId(7), LocalityId(8)]
        );
        assert_eq!(properties.first().map(|property| property.street_id), Some(StreetId(70)));
    }

    #[tokio::test]
    async fn explicit_collections_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/properties/700.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "collections": [
                    {"type": "FOGO", "next": {"date": "2026-10-21T06:00:00+11:00"}},
                    {"type": "Recycling", "next": {"date": "2026-10-28T06:00:00+11:00"}},
                    {"type": "Garbage", "next": {"date": "2026-10-21T06:00:00+11:00"}},
                    {"type": "Bulky items", "next": {"date": "2026-11-02T06:00:00+11:00"}}
                ]
            })))
            .mount(&server)
            .await;

        let schedule = schedule_port(&server)
            .schedule(PropertyId(700))
            .await
            .expect("schedule");

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.get(BinKind::Recycling).map(|next| next.day()), Some(day(28)));
    }

    #[tokio::test]
    async fn collection_day_is_synthesized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/properties/701.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"collections": [], "collection_day": 3})),
            )
            .mount(&server)
            .await;

        let schedule = schedule_port(&server)
            .schedule(PropertyId(701))
            .await
            .expect("schedule");

        // 2026-10-21 falls in odd ISO week 43, so landfill goes first.
        assert_eq!(schedule.get(BinKind::Organic).map(|next| next.day()), Some(day(21)));
        assert_eq!(schedule.get(BinKind::Landfill).map(|next| next.day()), Some(day(21)));
        assert_eq!(schedule.get(BinKind::Recycling).map(|next| next.day()), Some(day(28)));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/properties/702.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = schedule_port(&server).schedule(PropertyId(702)).await;

        assert!(matches!(
            result,
            Err(PortError::Status(StatusCode::SERVICE_UNAVAILABLE))
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/localities.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let result = reference(&server).localities().await;

        assert!(matches!(result, Err(PortError::Decode(_))));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/localities.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"localities": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let result = reference(&server).localities().await;

        assert!(matches!(result, Err(PortError::Transport(_))));
    }

    #[tokio::test]
    async fn materials_default_to_landfill() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/materials.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "materials": [
                    {"title": "Pizza box", "keywords": "cardboard", "bin_type": "recycle"},
                    {"title": "Nappies", "keywords": null}
                ]
            })))
            .mount(&server)
            .await;

        let materials = reference(&server).materials().await.expect("materials");

        assert_eq!(
            materials.iter().map(|material| material.bin.clone()).collect::<Vec<_>>(),
            vec![MaterialBin::Recycle, MaterialBin::Waste]
        );
    }

    #[tokio::test]
    async fn events_accept_bare_and_wrapped_lists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"title": "Clean up day", "start_date": "2026-10-25"},
                {"start_date": "soon"}
            ])))
            .mount(&server)
            .await;

        let events = reference(&server).events().await.expect("events");

        assert_eq!(events.len(), 2);
        assert_eq!(events.first().and_then(|event| event.start_date), Some(day(25)));
        assert_eq!(events.get(1).map(|event| event.title.as_str()), Some("Upcoming Event"));
        assert_eq!(events.get(1).and_then(|event| event.start_date), None);

        let wrapped = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "events": [{"title": "Swap meet", "start_date": "2026-10-30"}]
            })))
            .mount(&wrapped)
            .await;

        let events = reference(&wrapped).events().await.expect("events");
        assert_eq!(events.first().map(|event| event.title.as_str()), Some("Swap meet"));
    }

    #[tokio::test]
    async fn forecast_picks_requested_day() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("forecast_days", "3"))
            .and(query_param("timezone", "Australia/Sydney"))
            .and(query_param(
                "daily",
                "precipitation_sum,wind_speed_10m_max,weather_code",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2026-10-19", "2026-10-20", "2026-10-21"],
                    "precipitation_sum": [0.0, 1.2, 7.8],
                    "wind_speed_10m_max": [12.0, 30.5, null],
                    "weather_code": [1, 3, 61]
                }
            })))
            .mount(&server)
            .await;

        let config = config(&server);
        let port = OpenMeteoForecastPort::new(http_client(&config).expect("client"), &config);

        let sample = port.daily(2).await.expect("forecast");

        assert_eq!(sample.date, day(21));
        assert!((sample.rainfall_mm - 7.8).abs() < f64::EPSILON);
        assert!(sample.wind_kmh.abs() < f64::EPSILON);
        assert_eq!(sample.weather_code, Some(61));
    }

    #[tokio::test]
    async fn forecast_without_the_day_is_missing_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {"time": ["2026-10-19"], "precipitation_sum": [0.0],
                          "wind_speed_10m_max": [5.0], "weather_code": [0]}
            })))
            .mount(&server)
            .await;

        let config = config(&server);
        let port = OpenMeteoForecastPort::new(http_client(&config).expect("client"), &config);

        assert!(matches!(port.daily(4).await, Err(PortError::MissingData(_))));
    }
}
