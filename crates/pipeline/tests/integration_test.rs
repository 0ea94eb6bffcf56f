//! Integration tests for the pipeline.
//!
//! These tests run the full record -> similarity build on small catalogs
//! and check the properties every build must have.

use data_loader::MovieRecord;
use pipeline::{CountVectorizer, FeaturePipeline};

fn tokens(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn create_test_records() -> Vec<MovieRecord> {
    vec![
        MovieRecord {
            id: 19995,
            title: "Avatar".to_string(),
            genres: tokens(&["Action", "Adventure", "ScienceFiction"]),
            keywords: tokens(&["cultureclash", "future", "spacewar", "spacecolony"]),
            cast: tokens(&["SamWorthington", "ZoeSaldana", "SigourneyWeaver"]),
            director: tokens(&["JamesCameron"]),
            overview_tokens: tokens(&["In", "the", "22nd", "century,", "a", "paraplegic", "Marine", "is", "dispatched", "to", "the", "moon", "Pandora."]),
        },
        MovieRecord {
            id: 679,
            title: "Aliens".to_string(),
            genres: tokens(&["Horror", "Action", "Thriller", "ScienceFiction"]),
            keywords: tokens(&["android", "spacemarine", "alien", "future"]),
            cast: tokens(&["SigourneyWeaver", "MichaelBiehn", "JamesRemar"]),
            director: tokens(&["JamesCameron"]),
            overview_tokens: tokens(&["Ripley", "returns", "with", "a", "squad", "of", "space", "marines."]),
        },
        MovieRecord {
            id: 597,
            title: "Titanic".to_string(),
            genres: tokens(&["Drama", "Romance", "Thriller"]),
            keywords: tokens(&["shipwreck", "iceberg", "ship", "love"]),
            cast: tokens(&["KateWinslet", "LeonardoDiCaprio", "FrancesFisher"]),
            director: tokens(&["JamesCameron"]),
            overview_tokens: tokens(&["A", "love", "story", "aboard", "a", "doomed", "ship."]),
        },
        MovieRecord {
            id: 862,
            title: "Toy Story".to_string(),
            genres: tokens(&["Animation", "Comedy", "Family"]),
            keywords: tokens(&["jealousy", "toy", "friendship"]),
            cast: tokens(&["TomHanks", "TimAllen", "DonRickles"]),
            director: tokens(&["JohnLasseter"]),
            overview_tokens: tokens(&["Woody", "the", "cowboy", "doll", "feels", "threatened."]),
        },
    ]
}

#[test]
fn test_full_build_properties() {
    let records = create_test_records();
    let model = FeaturePipeline::new().run(&records).unwrap();
    let sim = &model.similarity;

    assert_eq!(sim.len(), records.len());
    for i in 0..sim.len() {
        assert_eq!(sim.get(i, i), Some(1.0));
        for j in 0..sim.len() {
            let v = sim.get(i, j).unwrap();
            assert!((0.0..=1.0).contains(&v));
            assert!((v - sim.get(j, i).unwrap()).abs() < 1e-9);
        }
    }
}

#[test]
fn test_build_is_deterministic() {
    let records = create_test_records();
    let pipeline = FeaturePipeline::new();

    let first = pipeline.run(&records).unwrap();
    let second = pipeline.run(&records).unwrap();

    assert_eq!(first.vocabulary.terms(), second.vocabulary.terms());
    assert_eq!(first.features, second.features);
    assert_eq!(first.similarity, second.similarity);
}

#[test]
fn test_related_movies_score_higher() {
    let records = create_test_records();
    let model = FeaturePipeline::new().run(&records).unwrap();
    let sim = &model.similarity;

    // Avatar shares genres, a cast member and a director with Aliens,
    // and no feature token at all with Toy Story
    assert!(sim.get(0, 1).unwrap() > sim.get(0, 3).unwrap());
    assert_eq!(sim.get(0, 3), Some(0.0));
}

#[test]
fn test_tag_text_is_stemmed_and_ordered() {
    let records = create_test_records();
    let model = FeaturePipeline::new().run(&records).unwrap();

    let toy_story = &model.movies[3].tag_text;
    assert!(toy_story.starts_with("woodi the cowboy doll"));
    assert!(toy_story.ends_with("friendship"));
    assert!(toy_story.contains("tomhank"));
}

#[test]
fn test_small_vocabulary_cap() {
    let records = create_test_records();
    let model = FeaturePipeline::new()
        .with_vectorizer(CountVectorizer::new().with_max_vocab(3))
        .run(&records)
        .unwrap();

    assert_eq!(model.vocabulary.len(), 3);
    assert_eq!(model.features.n_cols(), 3);
    // "jamescameron" appears in three movies and outranks single-use terms
    assert!(model.vocabulary.get("jamescameron").is_some());
}
