use std::collections::BTreeMap;

use super::image::PodImage;

pub fn get_pod_labels(dummy_name: &str, image: &PodImage) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app.kubernetes.io/name".to_owned(), "Dummy".to_owned()),
        ("app.kubernetes.io/instance".to_owned(), dummy_name.to_owned()),
        ("app.kubernetes.io/version".to_owned(), image.tag.to_owned()),
        ("app.kubernetes.io/part-of".to_owned(), "dummy-operator".to_owned()),
        ("app.kubernetes.io/created-by".to_owned(), "controller-manager".to_owned()),
    ])
}
