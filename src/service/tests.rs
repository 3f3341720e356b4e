use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::answer::AnswerError;
use crate::cache::CacheStatus;
use crate::constants::{DEFAULT_MAX_RESULTS, FETCH_CAP, TOP_K_PAPERS};
use crate::embedding::{MockEmbedder, TextEmbedder};
use crate::generation::MockGenerator;
use crate::paper::RankedSet;
use crate::ranking::RankingError;
use crate::source::{MockPaperSource, SourceError};

const TOPIC: &str = "transformer attention mechanisms";

fn service(source: MockPaperSource) -> ResearchService<MockPaperSource> {
    ResearchService::new(source, Arc::new(ModelHub::stub()), ServiceSettings::default())
}

fn source_with(count: usize) -> MockPaperSource {
    MockPaperSource::new().with_topic(TOPIC, MockPaperSource::sample_papers(TOPIC, count))
}

mod fetch_tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_caps_at_twenty() {
        let service = service(source_with(30));
        let (papers, status) = service.fetch_papers(TOPIC, DEFAULT_MAX_RESULTS).await.unwrap();

        assert_eq!(papers.len(), FETCH_CAP);
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(papers[0].title, format!("{TOPIC} study 0"));
    }

    #[tokio::test]
    async fn test_fetch_is_memoized() {
        let source = source_with(5);
        let service = service(source.clone());

        service.fetch_papers(TOPIC, 50).await.unwrap();
        let (_, status) = service.fetch_papers(TOPIC, 50).await.unwrap();

        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_cache_keyed_by_max_results() {
        let source = source_with(5);
        let service = service(source.clone());

        service.fetch_papers(TOPIC, 50).await.unwrap();
        service.fetch_papers(TOPIC, 10).await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_cache_expires() {
        let source = source_with(5);
        let settings = ServiceSettings {
            cache_ttl: Duration::from_millis(50),
            ..Default::default()
        };
        let service = ResearchService::new(source.clone(), Arc::new(ModelHub::stub()), settings);

        service.fetch_papers(TOPIC, 50).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        let (_, status) = service.fetch_papers(TOPIC, 50).await.unwrap();

        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_errors_are_not_cached() {
        let source = source_with(5);
        let service = service(source.clone());

        source.set_failing(true);
        let err = service.fetch_papers(TOPIC, 50).await.unwrap_err();
        assert!(matches!(
            err.root(),
            ServiceError::Source(SourceError::Unavailable { .. })
        ));

        source.set_failing(false);
        let (papers, status) = service.fetch_papers(TOPIC, 50).await.unwrap();
        assert_eq!(papers.len(), 5);
        assert_eq!(status, CacheStatus::Miss);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_upstream_call() {
        let source = source_with(5).with_latency(Duration::from_millis(100));
        let service = service(source.clone());

        let (a, b) = tokio::join!(
            service.fetch_papers(TOPIC, DEFAULT_MAX_RESULTS),
            service.fetch_papers(TOPIC, DEFAULT_MAX_RESULTS),
        );
        let (a, a_status) = a.unwrap();
        let (b, b_status) = b.unwrap();

        assert_eq!(source.call_count(), 1);
        assert_eq!(a, b);
        assert_ne!(a_status, b_status);
        assert!(a_status.is_hit() || b_status.is_hit());
    }

    #[tokio::test]
    async fn test_concurrent_failure_reaches_every_caller() {
        let source = source_with(5).with_latency(Duration::from_millis(100));
        source.set_failing(true);
        let service = service(source.clone());

        let (a, b) = tokio::join!(
            service.fetch_papers(TOPIC, DEFAULT_MAX_RESULTS),
            service.fetch_papers(TOPIC, DEFAULT_MAX_RESULTS),
        );

        assert_eq!(source.call_count(), 1);
        for err in [a.unwrap_err(), b.unwrap_err()] {
            assert!(matches!(err.root(), ServiceError::Source(_)));
            assert!(!err.is_client_error());
        }
    }

    #[tokio::test]
    async fn test_fetch_blank_topic() {
        let service = service(source_with(5));
        let err = service.fetch_papers("  ", 50).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyTopic));
        assert!(err.is_client_error());
    }
}

mod rank_tests {
    use super::*;

    #[tokio::test]
    async fn test_rank_empty_batch_rejected() {
        let service = service(source_with(0));
        let err = service.rank_papers(TOPIC, &[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Ranking(RankingError::EmptyBatch)));
    }

    #[tokio::test]
    async fn test_rank_is_memoized_per_batch() {
        let embedder = MockEmbedder::new(4);
        let hub = ModelHub::preloaded(Arc::new(embedder.clone()), Arc::new(MockGenerator::new("x")));
        let service =
            ResearchService::new(source_with(0), Arc::new(hub), ServiceSettings::default());
        let papers = MockPaperSource::sample_papers(TOPIC, 6);

        let (first, s1) = service.rank_papers(TOPIC, &papers).await.unwrap();
        let (second, s2) = service.rank_papers(TOPIC, &papers).await.unwrap();
        let (_, s3) = service.rank_papers(TOPIC, &papers[..3]).await.unwrap();

        assert_eq!((s1, s2, s3), (CacheStatus::Miss, CacheStatus::Hit, CacheStatus::Miss));
        assert_eq!(first, second);
        assert_eq!(embedder.batch_calls(), 4);
    }

    #[tokio::test]
    async fn test_concurrent_ranks_embed_once() {
        let embedder = MockEmbedder::new(4);
        let hub = ModelHub::preloaded(Arc::new(embedder.clone()), Arc::new(MockGenerator::new("x")));
        let service =
            ResearchService::new(source_with(0), Arc::new(hub), ServiceSettings::default());
        let papers = MockPaperSource::sample_papers(TOPIC, 6);

        let (a, b) = tokio::join!(
            service.rank_papers(TOPIC, &papers),
            service.rank_papers(TOPIC, &papers),
        );

        assert_eq!(a.unwrap().0, b.unwrap().0);
        assert_eq!(embedder.batch_calls(), 2);
    }
}

mod pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_and_rank_keeps_top_five() {
        let service = service(source_with(12));

        match service.fetch_and_rank(TOPIC).await.unwrap() {
            FetchOutcome::Ranked {
                batch,
                ranked,
                cache,
            } => {
                assert_eq!(batch.len(), 12);
                assert_eq!(batch.topic, TOPIC);
                assert_eq!(ranked.len(), TOP_K_PAPERS);
                assert_eq!(cache, CacheStatus::Miss);
                let scores: Vec<f32> = ranked.papers().iter().map(|p| p.score).collect();
                assert!(scores.windows(2).all(|w| w[0] >= w[1]));
                assert!(ranked.iter().all(|p| batch.papers.contains(p)));
            }
            FetchOutcome::NoPapers => panic!("expected ranked papers"),
        }
    }

    #[tokio::test]
    async fn test_fetch_and_rank_second_call_hits_cache() {
        let service = service(source_with(8));
        service.fetch_and_rank(TOPIC).await.unwrap();

        match service.fetch_and_rank(TOPIC).await.unwrap() {
            FetchOutcome::Ranked { cache, .. } => assert_eq!(cache, CacheStatus::Hit),
            FetchOutcome::NoPapers => panic!("expected ranked papers"),
        }
    }

    #[tokio::test]
    async fn test_fetch_and_rank_no_papers_skips_ranking() {
        let embedder = MockEmbedder::new(4);
        let hub = ModelHub::preloaded(Arc::new(embedder.clone()), Arc::new(MockGenerator::new("x")));
        let service = ResearchService::new(
            MockPaperSource::new(),
            Arc::new(hub),
            ServiceSettings::default(),
        );

        let outcome = service.fetch_and_rank("nothing here").await.unwrap();
        assert_eq!(outcome, FetchOutcome::NoPapers);
        assert_eq!(embedder.batch_calls(), 0);
    }

    #[tokio::test]
    async fn test_answer_is_never_cached() {
        let generator = MockGenerator::new("An answer.");
        let hub = ModelHub::preloaded(Arc::new(MockEmbedder::new(4)), Arc::new(generator.clone()));
        let service = ResearchService::new(source_with(6), Arc::new(hub), ServiceSettings::default());

        let FetchOutcome::Ranked { ranked, .. } = service.fetch_and_rank(TOPIC).await.unwrap() else {
            panic!("expected ranked papers");
        };

        let a = service.answer("What is self-attention?", &ranked).await.unwrap();
        let b = service.answer("What is self-attention?", &ranked).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(generator.prompts().len(), 2);
        assert!(a.citations().iter().all(|c| ranked.contains(c)));
        assert!(a.citations().len() <= 2);
    }

    #[tokio::test]
    async fn test_answer_empty_question() {
        let service = service(source_with(6));
        let ranked = RankedSet::new(vec![]);
        let err = service.answer("", &ranked).await.unwrap_err();
        assert!(matches!(err, ServiceError::Answer(AnswerError::EmptyQuestion)));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_readiness_follows_source() {
        let source = source_with(1);
        let service = service(source.clone());
        assert!(service.is_ready().await);
        source.set_failing(true);
        assert!(!service.is_ready().await);
    }
}

mod model_hub_tests {
    use super::*;

    #[tokio::test]
    async fn test_hub_without_paths_loads_stubs() {
        let hub = ModelHub::new(ModelPaths::default());
        assert!(!hub.is_loaded());

        let models = hub.models().await.unwrap();
        assert!(models.embedder.is_stub());
        assert!(models.generator.is_stub());
        assert!(hub.is_loaded());
    }

    #[tokio::test]
    async fn test_hub_loads_once() {
        let hub = ModelHub::new(ModelPaths::default());
        let a = hub.models().await.unwrap().embedder.clone();
        let b = hub.models().await.unwrap().embedder.clone();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_hub_missing_model_dir_fails_and_retries() {
        let hub = ModelHub::new(ModelPaths {
            embedder: Some("/nonexistent/embedder".into()),
            generator: None,
        });

        let err = hub.models().await.unwrap_err();
        assert!(matches!(err, ServiceError::EmbedderLoad(_)));
        assert!(!hub.is_loaded());
        assert!(hub.models().await.is_err());
    }

    #[test]
    fn test_preloaded_hub_is_ready() {
        let hub = ModelHub::stub();
        assert!(hub.is_loaded());
        assert!(hub.loaded().is_some_and(|m| m.embedder.embedding_dim() > 0));
    }

    #[test]
    fn test_paths_from_config() {
        let config = crate::config::Config {
            embedder_path: Some("/models/minilm".into()),
            ..Default::default()
        };
        let paths = ModelPaths::from(&config);
        assert_eq!(paths.embedder, Some("/models/minilm".into()));
        assert!(paths.generator.is_none());
    }

    #[test]
    fn test_settings_from_config_carries_seed() {
        let config = crate::config::Config {
            generation_seed: Some(3),
            cache_ttl_secs: 10,
            ..Default::default()
        };
        let settings = ServiceSettings::from(&config);
        assert_eq!(settings.generation.seed, Some(3));
        assert_eq!(settings.cache_ttl, Duration::from_secs(10));
    }
}
