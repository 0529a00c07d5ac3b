use farkmeans::metrics::{euclidean_distortion, euclidean_silhouette};
use farkmeans::{Dataset, InitMethod, KMeans, Labels, StandardScaler};
use std::collections::BTreeMap;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== K-Means Clustering ===\n");

    // Three natural clusters plus a few stragglers
    let rows = vec![
        // Cluster 1: around (2, 2)
        [1.5, 1.8], [2.0, 2.2], [2.3, 1.9], [1.8, 2.5], [2.1, 1.7],
        // Cluster 2: around (8, 8)
        [7.8, 8.2], [8.1, 7.9], [8.3, 8.1], [7.9, 8.4], [8.2, 7.7],
        // Cluster 3: around (2, 8)
        [1.9, 7.8], [2.2, 8.1], [1.7, 8.3], [2.4, 7.9], [2.0, 8.2],
        // Stragglers
        [5.0, 5.0], [0.0, 0.0], [10.0, 0.0],
    ];
    let dataset = Dataset::from_rows(&["x", "y"], &rows)?;

    println!(
        "Dataset: {} samples, {} features",
        dataset.n_samples(),
        dataset.n_features()
    );
    println!("Expected: 3 natural clusters + some stragglers\n");

    let mut scaler = StandardScaler::new();
    let x_scaled = scaler.fit_transform(&dataset.features)?;

    println!("=== Choosing k ===");
    for k in 2..=5 {
        let mut kmeans = KMeans::new(k).random_state(42);
        let labels = kmeans.fit_predict(&x_scaled)?;

        println!(
            "k={}: distortion={:.4}, silhouette={:.4}, iterations={}",
            k,
            euclidean_distortion(&x_scaled, &labels)?,
            euclidean_silhouette(&x_scaled, &labels)?,
            kmeans.n_iter.unwrap_or(0)
        );
    }

    println!("\n=== Seeding strategies (k=3, single restart) ===");
    for (name, init) in [
        ("furthest-point", InitMethod::FurthestPoint),
        ("random", InitMethod::Random),
    ] {
        let mut kmeans = KMeans::new(3).init(init).n_restarts(1).random_state(7);
        kmeans.fit(&x_scaled)?;
        println!("{:>15}: inertia={:.4}", name, kmeans.inertia.unwrap_or(f64::NAN));
    }

    println!("\n=== Detailed Analysis (k=3) ===");
    let mut kmeans = KMeans::new(3).random_state(42);
    let labels = kmeans.fit_predict(&x_scaled)?;

    let centroids = scaler.inverse_transform(kmeans.get_centroids()?)?;
    for (i, c) in centroids.outer_iter().enumerate() {
        println!("  Centroid {}: ({:.2}, {:.2})", i, c[0], c[1]);
    }
    print_cluster_summary(&labels);

    // Out-of-sample assignment uses the stored centroids
    let new_points = Dataset::from_rows(&["x", "y"], &[[2.0, 2.0], [8.0, 8.0], [2.0, 8.0]])?;
    let new_labels = kmeans.predict(&scaler.transform(&new_points.features)?)?;
    println!("\nNew points assigned to clusters: {:?}", new_labels.to_vec());

    Ok(())
}

fn print_cluster_summary(labels: &Labels) {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &label in labels.iter() {
        *counts.entry(label).or_default() += 1;
    }

    println!("  Cluster assignments:");
    for (cluster_id, count) in counts {
        println!("    Cluster {}: {} points", cluster_id, count);
    }
}
