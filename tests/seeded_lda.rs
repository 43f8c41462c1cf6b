use anyhow::Result;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Dirichlet;
use seededlda::core::{DocumentFeatureMatrix, SeedDictionary};
use seededlda::lda::{
    build_seed_matrix, fit_lda, fit_seeded_lda, fit_with_seeds, LdaError, Priors,
    SamplerSettings, Seeding,
};

const SPACE_WORDS: [&str; 5] = ["space", "planet", "rocket", "alien", "orbit"];
const ECONOMY_WORDS: [&str; 5] = ["market", "stock", "price", "trade", "bank"];
const SHARED_WORDS: [&str; 2] = ["news", "today"];

/// Two-topic corpus: every document mixes a space and an economy word
/// distribution with Dirichlet proportions, plus a little shared vocabulary.
fn synthetic_corpus(n_docs: usize, doc_len: usize, seed: u64) -> DocumentFeatureMatrix {
    let features: Vec<String> = SPACE_WORDS
        .iter()
        .chain(ECONOMY_WORDS.iter())
        .chain(SHARED_WORDS.iter())
        .map(|s| s.to_string())
        .collect();
    let v = features.len();
    let mut space = vec![0.0; v];
    let mut economy = vec![0.0; v];
    for w in 0..5 {
        space[w] = 0.18;
        economy[w + 5] = 0.18;
    }
    for w in 10..v {
        space[w] = 0.05;
        economy[w] = 0.05;
    }
    let space = WeightedIndex::new(&space).unwrap();
    let economy = WeightedIndex::new(&economy).unwrap();
    let mixture = Dirichlet::new(&[0.3, 0.3]).unwrap();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n_docs);
    for _ in 0..n_docs {
        let proportions = mixture.sample(&mut rng);
        let pick = WeightedIndex::new(&proportions).unwrap();
        let mut row = vec![0u32; v];
        for _ in 0..doc_len {
            let w = if pick.sample(&mut rng) == 0 {
                space.sample(&mut rng)
            } else {
                economy.sample(&mut rng)
            };
            row[w] += 1;
        }
        rows.push(row);
    }
    let documents = (0..n_docs).map(|d| format!("doc{}", d + 1)).collect();
    DocumentFeatureMatrix::from_dense(documents, features, &rows).unwrap()
}

fn dictionary() -> SeedDictionary {
    SeedDictionary::from_pairs(vec![
        ("space", vec!["space", "planet*"]),
        ("economy", vec!["market*", "stock"]),
    ])
    .unwrap()
}

fn settings(max_iter: usize) -> SamplerSettings {
    SamplerSettings {
        max_iter,
        ..Default::default()
    }
}

#[test]
fn seeded_topics_recover_their_vocabulary() -> Result<()> {
    let dfm = synthetic_corpus(40, 60, 7);
    let seeding = Seeding {
        weight: 0.01,
        ..Seeding::default()
    };
    let model = fit_seeded_lda(&dfm, &dictionary(), &seeding, &Priors::default(), &settings(500))?;
    assert_eq!(model.labels(), &["space".to_string(), "economy".to_string()]);
    assert!(model.is_seeded());

    let terms = model.top_terms(3);
    for term in terms.column("space").unwrap() {
        assert!(SPACE_WORDS.contains(&term.as_str()), "unexpected space term {}", term);
    }
    for term in terms.column("economy").unwrap() {
        assert!(ECONOMY_WORDS.contains(&term.as_str()), "unexpected economy term {}", term);
    }
    for row in model.phi().outer_iter() {
        assert!((row.sum() - 1.0).abs() < 1e-9);
    }
    for row in model.theta().outer_iter() {
        assert!((row.sum() - 1.0).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn same_seed_gives_identical_posteriors() -> Result<()> {
    let dfm = synthetic_corpus(12, 30, 3);
    let a = fit_lda(&dfm, 3, &Priors::default(), &settings(50))?;
    let b = fit_lda(&dfm, 3, &Priors::default(), &settings(50))?;
    assert_eq!(a.phi(), b.phi());
    assert_eq!(a.theta(), b.theta());

    let other = SamplerSettings {
        random_seed: 7,
        ..settings(50)
    };
    let c = fit_lda(&dfm, 3, &Priors::default(), &other)?;
    assert_ne!(a.theta(), c.theta());
    Ok(())
}

#[test]
fn single_topic_model_assigns_everything_to_it() -> Result<()> {
    let dfm = synthetic_corpus(5, 20, 11);
    let model = fit_lda(&dfm, 1, &Priors::default(), &settings(10))?;
    assert_eq!(model.labels(), &["topic1".to_string()]);
    for value in model.theta().iter() {
        assert!((value - 1.0).abs() < 1e-12);
    }
    assert!(model.dominant_topics().iter().all(|t| t == "topic1"));
    Ok(())
}

#[test]
fn as_many_topics_as_documents() -> Result<()> {
    let dfm = synthetic_corpus(6, 20, 5);
    let model = fit_lda(&dfm, 6, &Priors::default(), &settings(20))?;
    assert_eq!(model.theta().dim(), (6, 6));
    assert_eq!(model.phi().dim(), (6, dfm.n_features()));
    Ok(())
}

#[test]
fn zero_topics_is_rejected() {
    let dfm = synthetic_corpus(4, 10, 1);
    let err = fit_lda(&dfm, 0, &Priors::default(), &settings(10)).unwrap_err();
    assert!(matches!(err, LdaError::InvalidArgument(_)));
    assert!(err.to_string().contains("k must be larger than zero"));
}

#[test]
fn residual_topic_adds_one_column() -> Result<()> {
    let dfm = synthetic_corpus(10, 30, 2);
    let seeding = Seeding {
        residual: true,
        ..Seeding::default()
    };
    let model = fit_seeded_lda(&dfm, &dictionary(), &seeding, &Priors::default(), &settings(30))?;
    assert_eq!(model.n_topics(), 3);
    assert_eq!(model.labels()[2], "other");
    assert_eq!(model.theta().dim(), (10, 3));
    Ok(())
}

#[test]
fn invalid_seeding_inputs_are_rejected() {
    let dfm = synthetic_corpus(4, 10, 1);
    let negative = Seeding {
        weight: -0.5,
        ..Seeding::default()
    };
    let err = fit_seeded_lda(&dfm, &dictionary(), &negative, &Priors::default(), &settings(5))
        .unwrap_err();
    assert!(matches!(err, LdaError::InvalidArgument(_)));

    let err = SeedDictionary::from_toml_str("topic = 3").unwrap_err();
    assert!(matches!(err, LdaError::InvalidArgument(_)));
    let err = SeedDictionary::from_pairs(Vec::<(&str, Vec<&str>)>::new()).unwrap_err();
    assert!(matches!(err, LdaError::InvalidArgument(_)));
}

#[test]
fn seeds_built_for_another_vocabulary_are_rejected() {
    let dfm = synthetic_corpus(4, 10, 1);
    let mut vocabulary = dfm.features().to_vec();
    vocabulary.reverse();
    let seeds =
        build_seed_matrix(&vocabulary, dfm.total(), &dictionary(), &Seeding::default()).unwrap();
    let err = fit_with_seeds(&dfm, &seeds, &Priors::default(), &settings(5)).unwrap_err();
    assert!(err.to_string().contains("seed features must match model features"));
}

#[test]
fn top_terms_extend_monotonically() -> Result<()> {
    let dfm = synthetic_corpus(10, 30, 4);
    let model = fit_lda(&dfm, 2, &Priors::default(), &settings(30))?;
    let short = model.top_terms(3);
    let long = model.top_terms(5);
    assert_eq!(short.n_rows(), 3);
    assert_eq!(long.n_rows(), 5);
    for (a, b) in short.columns.iter().zip(&long.columns) {
        assert_eq!(a.as_slice(), &b[..3]);
    }
    assert_eq!(model.top_terms(1000).n_rows(), dfm.n_features());
    Ok(())
}

#[test]
fn dominant_topics_are_model_labels() -> Result<()> {
    let dfm = synthetic_corpus(10, 30, 9);
    let model = fit_seeded_lda(
        &dfm,
        &dictionary(),
        &Seeding {
            residual: true,
            ..Seeding::default()
        },
        &Priors::default(),
        &settings(30),
    )?;
    let dominant = model.dominant_topics();
    assert_eq!(dominant.len(), 10);
    assert!(dominant.iter().all(|t| model.labels().contains(t)));
    Ok(())
}
