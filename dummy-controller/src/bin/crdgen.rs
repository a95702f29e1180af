use dummy_controller_core::resources::crd::v1alpha1::dummy::Dummy;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&Dummy::crd())?);

    Ok(())
}
