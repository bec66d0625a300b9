//! Example demonstrating error handling with the k-NN classifier.
//!
//! Shows how the classifier reports invalid configuration, empty training
//! sets and metric domain failures, and how ties leave an object
//! unclassified instead of failing.

use dsr_helpers::{L2Dist, LabeledObject, Metric};
use k_nn::{KnnClassifier, KnnError, classify_objects};
use ndarray::array;

fn main() {
    println!("k-NN Classifier Error Handling Examples");
    println!("=======================================");

    // Example 1: Handle invalid k value
    println!("\n1. Handling invalid k value (k=0):");
    let training_data = vec![
        LabeledObject::new(array![1.0, 1.0], "A"),
        LabeledObject::new(array![2.0, 2.0], "A"),
    ];

    match KnnClassifier::new(0, &training_data, L2Dist) {
        Ok(_) => println!("   Classifier created successfully"),
        Err(KnnError::InvalidK) => println!("   ✓ Caught expected error: {}", KnnError::InvalidK),
        Err(e) => println!("   ✗ Unexpected error: {}", e),
    }

    // Example 2: Handle empty training set
    println!("\n2. Handling empty training set:");
    let empty_data: Vec<LabeledObject<&str, f64>> = vec![];

    match KnnClassifier::new(3, &empty_data, L2Dist) {
        Ok(classifier) => match classifier.predict(array![1.0, 1.0].view()) {
            Ok(label) => println!("   Predicted label: {:?}", label),
            Err(e @ KnnError::EmptyTrainingSet) => println!("   ✓ Caught expected error: {}", e),
            Err(e) => println!("   ✗ Unexpected error: {}", e),
        },
        Err(e) => println!("   Error creating classifier: {}", e),
    }

    // Example 3: A metric that is undefined for the data
    println!("\n3. Pearson dissimilarity against a constant vector:");
    let training_data = vec![
        LabeledObject::new(array![1.0, 2.0, 3.0], "A"),
        LabeledObject::new(array![5.0, 5.0, 5.0], "B"),
    ];
    let mut test_data = vec![LabeledObject::new(array![2.0, 3.0, 1.0], "A")];

    match classify_objects(Metric::Pearson, &training_data, &mut test_data, 1) {
        Ok(()) => println!("   Classified without errors"),
        Err(e) => {
            println!("   ✓ Caught expected error: {}", e);
            if let KnnError::Metric { source, .. } = e {
                println!("     caused by: {}", source);
            }
        }
    }

    // Example 4: Ties abstain
    println!("\n4. Equidistant classes leave the object unclassified:");
    let training_data = vec![
        LabeledObject::new(array![0.0, 0.0], "A"),
        LabeledObject::new(array![10.0, 10.0], "B"),
    ];
    let mut test_data = vec![
        LabeledObject::new(array![5.0, 5.0], "A"),
        LabeledObject::new(array![1.0, 1.0], "A"),
    ];

    match classify_objects(Metric::Manhattan, &training_data, &mut test_data, 1) {
        Ok(()) => {
            for object in &test_data {
                match object.classifier_decision() {
                    Some(label) => println!("   {:?} -> {}", object.descriptors, label),
                    None => println!("   {:?} -> unclassified (tie)", object.descriptors),
                }
            }
        }
        Err(e) => println!("   ✗ Classification failed: {}", e),
    }

    println!("\nAll examples completed successfully!");
}
