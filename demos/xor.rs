use rand::rngs::StdRng;
use rand::SeedableRng;
use tapeloop::{
    Activation, BinaryAccuracy, BinaryCrossEntropy, Dataset, FitConfig, Matrix, Model, Sgd,
    WeightedAffine,
};

fn main() -> tapeloop::Result<()> {
    let inputs = Matrix::from_rows(vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ])?;
    let expected_outputs = Matrix::from_rows(vec![vec![1.0], vec![0.0], vec![1.0], vec![0.0]])?;
    let dataset = Dataset::new(inputs.clone(), expected_outputs)?;

    let mut model = Model::new(2)
        .add(WeightedAffine::new(4).with_activation(Activation::Tanh))
        .add(WeightedAffine::new(1))
        .build(&mut StdRng::seed_from_u64(7))?
        .compile(
            BinaryCrossEntropy::default(),
            Sgd::new(0.5).with_momentum(0.9),
            vec![Box::new(BinaryAccuracy::default())],
        )?;

    let history = model.fit(&dataset, &FitConfig::new(2000, 4), &mut [])?;
    for (epoch, loss) in history.metric("loss").iter().enumerate().step_by(250) {
        println!("Epoch {epoch}: loss = {loss:.6}");
    }

    let predictions = model.predict(&inputs)?;
    for (input, output) in inputs.data.iter().zip(predictions.data.iter()) {
        println!("Input: {:?} -> Output: {:.4}", input, output[0]);
    }
    Ok(())
}
