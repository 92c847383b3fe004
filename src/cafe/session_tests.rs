//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::Utils::config::SessionSettings;
    use crate::cafe::evaluator::{CalculationKind, DerivativeEvaluator, ResultBundle, SymbolicEngine};
    use crate::cafe::service::{ChefService, ServiceError};
    use crate::cafe::session::{
        CafeSession, ServiceOutcome, ServiceReply, ServiceRequest, View,
    };
    use crate::cafe::worker::{ServiceWorker, fulfil};
    use crate::symbolic::symbolic_errors::ComputationError;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use std::time::Duration;

    fn explained(seq: u64, html: &str) -> ServiceReply {
        ServiceReply {
            seq,
            outcome: ServiceOutcome::Explanation(Ok(html.to_string())),
        }
    }

    fn explain_seq(request: Option<ServiceRequest>) -> u64 {
        match request {
            Some(ServiceRequest::Explain { seq, .. }) => seq,
            other => panic!("expected an explanation request, got {:?}", other),
        }
    }

    /// Chef that echoes what it was asked.
    struct EchoChef;

    impl ChefService for EchoChef {
        fn explain(
            &self,
            kind: CalculationKind,
            expression: &str,
            _results: &ResultBundle,
        ) -> Result<String, ServiceError> {
            Ok(format!("<p>{} of <b>{}</b></p>", kind, expression))
        }

        fn analyze_image(&self, _image_base64: &str, mime: &str) -> Result<String, ServiceError> {
            match mime {
                "image/png" => Ok("```\nf(x,y) = x*y\n```".to_string()),
                _ => Err(ServiceError::EmptyReply),
            }
        }
    }

    /// Chef that answers long after anyone waits for it.
    struct SlowChef;

    impl ChefService for SlowChef {
        fn explain(
            &self,
            _kind: CalculationKind,
            _expression: &str,
            _results: &ResultBundle,
        ) -> Result<String, ServiceError> {
            std::thread::sleep(Duration::from_millis(500));
            Ok("<p>late</p>".to_string())
        }

        fn analyze_image(&self, _image_base64: &str, _mime: &str) -> Result<String, ServiceError> {
            Err(ServiceError::EmptyReply)
        }
    }

    #[test]
    fn test_starts_in_lobby_with_defaults() {
        let session = CafeSession::new();
        assert_eq!(session.view(), View::Lobby);
        assert_eq!(session.expression(), "x^2 - y^2");
        assert_eq!((session.point().x, session.point().y), (0.0, 0.0));
        assert_eq!((session.direction().u, session.direction().v), (1.0, 1.0));
        assert!(session.results().is_none());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_lobby_computes_nothing() {
        let mut session = CafeSession::new();
        assert_eq!(session.set_expression("x*y"), None);
        assert_eq!(session.set_point(1.0, 1.0), None);
        assert!(session.results().is_none());
    }

    #[test]
    fn test_scenario_partial_default_recipe() {
        let mut session = CafeSession::new();
        session.set_point(1.0, 2.0);
        let request = session.navigate(View::Partial);
        assert_eq!(
            session.results(),
            Some(&ResultBundle::Partial {
                f_x: "2*x".to_string(),
                f_y: "-2*y".to_string(),
                val_x: 2.0,
                val_y: -4.0,
            })
        );
        match request {
            Some(ServiceRequest::Explain {
                kind, expression, ..
            }) => {
                assert_eq!(kind, CalculationKind::Partial);
                assert_eq!(expression, "x^2 - y^2");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(session.is_loading());
    }

    #[test]
    fn test_scenario_directional_default_recipe() {
        let mut session = CafeSession::new();
        session.set_point(1.0, 2.0);
        session.navigate(View::Directional);
        let Some(ResultBundle::Directional {
            vx,
            vy,
            u,
            v,
            directional_deriv,
            ..
        }) = session.results().cloned()
        else {
            panic!("expected a directional bundle");
        };
        assert_eq!((vx, vy), (2.0, -4.0));
        assert_relative_eq!(u, 0.7071, epsilon = 1e-4);
        assert_relative_eq!(v, 0.7071, epsilon = 1e-4);
        assert_relative_eq!(directional_deriv, -1.414, epsilon = 1e-3);
    }

    #[test]
    fn test_scenario_zero_heading() {
        let mut session = CafeSession::new();
        session.set_point(1.0, 2.0);
        session.navigate(View::Directional);
        session.set_direction(0.0, 0.0);
        let Some(ResultBundle::Directional {
            u,
            v,
            directional_deriv,
            ..
        }) = session.results().cloned()
        else {
            panic!("expected a directional bundle");
        };
        assert_eq!((u, v), (0.0, 0.0));
        assert!(directional_deriv.is_finite());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_scenario_bad_recipe_keeps_previous_results() {
        let mut session = CafeSession::new();
        session.set_point(1.0, 2.0);
        let first = explain_seq(session.navigate(View::Partial));
        let before = session.results().cloned();

        let request = session.set_expression("x^^2");
        assert_eq!(request, None);
        assert_eq!(session.results().cloned(), before);
        assert!(matches!(session.last_error(), Some(ComputationError::Parse { .. })));
        assert_eq!(session.expression(), "x^^2");

        // the sequence number was not consumed by the failure
        session.apply_reply(explained(first, "<p>still good</p>"));
        assert_eq!(session.explanation(), "<p>still good</p>");
        assert!(!session.is_loading());

        // fixing the recipe clears the error
        session.set_expression("x^2");
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_navigation_preserves_recipe_and_point() {
        let mut session = CafeSession::new();
        session.set_expression("sin(x)*exp(y)");
        session.set_point(0.5, -1.0);
        session.navigate(View::Partial);
        session.navigate(View::Directional);
        session.navigate(View::Partial);
        assert_eq!(session.expression(), "sin(x)*exp(y)");
        assert_eq!((session.point().x, session.point().y), (0.5, -1.0));
        assert_eq!(session.results().map(|r| r.kind()), Some(CalculationKind::Partial));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut session = CafeSession::new();
        session.set_point(2.0, 3.0);
        session.navigate(View::Directional);
        let first = session.results().cloned();
        session.recompute();
        session.recompute();
        assert_eq!(session.results().cloned(), first);
    }

    #[test]
    fn test_direction_ignored_in_bakery() {
        let mut session = CafeSession::new();
        session.navigate(View::Partial);
        assert_eq!(session.set_direction(3.0, 4.0), None);
        assert_eq!((session.direction().u, session.direction().v), (3.0, 4.0));
        assert!(session.set_direction(1.0, 0.0).is_none());
    }

    #[test]
    fn test_stale_explanation_is_discarded() {
        let mut session = CafeSession::new();
        let old = explain_seq(session.navigate(View::Partial));
        let new = explain_seq(session.set_point(1.0, 1.0));
        assert!(new > old);

        session.apply_reply(explained(new, "<p>new</p>"));
        assert!(!session.is_loading());
        session.apply_reply(explained(old, "<p>old</p>"));
        assert_eq!(session.explanation(), "<p>new</p>");
    }

    #[test]
    fn test_loading_waits_for_latest_reply() {
        let mut session = CafeSession::new();
        let old = explain_seq(session.navigate(View::Partial));
        let new = explain_seq(session.set_point(1.0, 1.0));

        session.apply_reply(explained(old, "<p>old</p>"));
        assert!(session.is_loading());
        assert_eq!(session.explanation(), "");

        // a failed reply still ends the wait and keeps the last explanation
        session.apply_reply(ServiceReply {
            seq: new,
            outcome: ServiceOutcome::Explanation(Err(ServiceError::Network("timeout".to_string()))),
        });
        assert!(!session.is_loading());
        assert_eq!(session.explanation(), "");
    }

    #[test]
    fn test_explanations_disabled() {
        let mut session = CafeSession::new();
        session.set_explanations_enabled(false);
        assert_eq!(session.navigate(View::Partial), None);
        assert!(session.results().is_some());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_extraction_replaces_recipe() {
        let mut session = CafeSession::new();
        session.navigate(View::Partial);
        let request = session.request_extraction("AAAA".to_string(), "image/png");
        assert!(session.is_loading());

        let reply = fulfil(&EchoChef, request);
        let follow_up = session.apply_reply(reply);
        assert_eq!(session.expression(), "x*y");
        assert_eq!(session.results().map(|r| r.derivatives().0.to_string()), Some("y".to_string()));
        assert!(matches!(follow_up, Some(ServiceRequest::Explain { .. })));
    }

    #[test]
    fn test_failed_extraction_keeps_recipe() {
        let mut session = CafeSession::new();
        let request = session.request_extraction("AAAA".to_string(), "image/gif");
        let follow_up = session.apply_reply(fulfil(&EchoChef, request));
        assert_eq!(follow_up, None);
        assert_eq!(session.expression(), "x^2 - y^2");
        assert!(!session.is_loading());
    }

    #[test]
    fn test_channels_are_numbered_independently() {
        let mut session = CafeSession::new();
        let explain = explain_seq(session.navigate(View::Partial));
        let extract = session.request_extraction("AAAA".to_string(), "image/png").seq();
        assert_eq!((explain, extract), (1, 1));

        session.apply_reply(explained(explain, "<p>done</p>"));
        // extraction is still due
        assert!(session.is_loading());
    }

    #[test]
    fn test_custom_settings() {
        let settings = SessionSettings {
            expression: "x*y".to_string(),
            point: [2.0, 3.0],
            direction: [0.0, 1.0],
        };
        let mut session =
            CafeSession::with_settings(DerivativeEvaluator::new(SymbolicEngine), &settings);
        session.set_explanations_enabled(false);
        session.navigate(View::Directional);
        let Some(ResultBundle::Directional { directional_deriv, .. }) = session.results().cloned()
        else {
            panic!("expected a directional bundle");
        };
        // along +y the slope of x*y is x
        assert_relative_eq!(directional_deriv, 2.0);
    }

    #[test]
    fn test_worker_round_trip() {
        let worker = ServiceWorker::new(Arc::new(EchoChef));
        let mut session = CafeSession::new();
        session.set_point(1.0, 2.0);
        let request = session.navigate(View::Partial).unwrap();
        worker.submit(request).join().unwrap();

        let reply = worker.wait_next(Duration::from_secs(5)).unwrap();
        session.apply_reply(reply);
        assert_eq!(
            session.explanation(),
            "<p>Partial Rate of Change of <b>x^2 - y^2</b></p>"
        );
        assert!(worker.try_drain().is_empty());
        assert!(worker.wait_next(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn test_settle_sends_explanation_after_extraction() {
        let worker = ServiceWorker::new(Arc::new(EchoChef));
        let mut session = CafeSession::new();
        session.set_point(1.0, 2.0);
        if let Some(request) = session.navigate(View::Partial) {
            worker.submit(request);
        }
        worker.submit(session.request_extraction("AAAA".to_string(), "image/png"));

        assert!(worker.settle(&mut session, Duration::from_secs(5)));
        assert!(!session.is_loading());
        assert_eq!(session.expression(), "x*y");
        assert_eq!(session.explanation(), "<p>Partial Rate of Change of <b>x*y</b></p>");
    }

    #[test]
    fn test_settle_gives_up_on_a_slow_chef() {
        let worker = ServiceWorker::new(Arc::new(SlowChef));
        let mut session = CafeSession::new();
        let request = session.navigate(View::Partial).unwrap();
        worker.submit(request);

        assert!(!worker.settle(&mut session, Duration::from_millis(20)));
        assert!(session.is_loading());
        assert_eq!(session.explanation(), "");
        assert!(session.results().is_some());
    }

    #[test]
    fn test_settle_without_pending_requests() {
        let worker = ServiceWorker::new(Arc::new(EchoChef));
        let mut session = CafeSession::new();
        assert!(worker.settle(&mut session, Duration::from_millis(10)));
    }
}
