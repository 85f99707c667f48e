use exhibit::PostcardRequest;
use foundation::math::{bearing_degrees, compass_point, distance_meters};

fn describe_distance(meters: f64) -> String {
    if meters < 1_000.0 {
        format!("{} m", (meters / 10.0).round() * 10.0)
    } else {
        format!("{:.1} km", meters / 1_000.0)
    }
}

/// Image prompt describing the view from the visited replica.
pub fn build_prompt(req: &PostcardRequest) -> String {
    let mut prompt = format!(
        "A vintage travel postcard photograph of a full-size Statue of Liberty replica \
         standing in {}, New York City, camera looking {}.",
        req.neighborhood,
        compass_point(req.heading_deg),
    );

    let to_original = distance_meters(req.visited, req.reference);
    if to_original >= req.reference_min_m {
        prompt.push_str(&format!(
            " The original Statue of Liberty is visible {} away to the {}.",
            describe_distance(to_original),
            compass_point(bearing_degrees(req.visited, req.reference)),
        ));
    }

    let others: Vec<String> = req
        .nearby
        .iter()
        .filter(|n| n.position != req.reference)
        .map(|n| {
            format!(
                "another replica {} to the {} in {}",
                describe_distance(n.distance_m),
                compass_point(n.bearing_deg),
                n.neighborhood
            )
        })
        .collect();
    if !others.is_empty() {
        prompt.push_str(&format!(" Also in view: {}.", others.join("; ")));
    }
    prompt.push_str(" Golden hour light, saturated colors, white border.");
    prompt
}
