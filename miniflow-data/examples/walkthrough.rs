//! Small graphs run end to end: sums, products, a linear layer, a sigmoid
//! over it, a mean squared error, and the gradients of a full backward pass.
//!
//! Run with `RUST_LOG=debug` to see the scheduler's log output.

use miniflow_core::{FeedDict, Graph, MiniflowError};

fn add() -> Result<(), MiniflowError> {
    let mut graph = Graph::new();
    let (x, y, z) = (graph.input(), graph.input(), graph.input());
    let f = graph.add(&[x, y, z])?;

    let mut feed = FeedDict::new();
    feed.bind("x", x, 10)?.bind("y", y, 5)?.bind("z", z, 3)?;
    let order = graph.topological_sort(&feed)?;
    let output = graph.forward_backward(f, &order)?;

    println!(
        "{} + {} + {} = {}",
        graph.render(x)?,
        graph.render(y)?,
        graph.render(z)?,
        output
    );
    Ok(())
}

fn multiply() -> Result<(), MiniflowError> {
    let mut graph = Graph::new();
    let (x, y, z) = (graph.input(), graph.input(), graph.input());
    let f = graph.multiply(&[x, y, z])?;

    let mut feed = FeedDict::new();
    feed.bind("x", x, 10)?.bind("y", y, 5)?.bind("z", z, 3)?;
    let order = graph.topological_sort(&feed)?;
    let output = graph.forward_backward(f, &order)?;

    println!(
        "{} * {} * {} = {}",
        graph.render(x)?,
        graph.render(y)?,
        graph.render(z)?,
        output
    );
    Ok(())
}

fn linear() -> Result<(), MiniflowError> {
    let mut graph = Graph::new();
    let (x, w, b) = (graph.input(), graph.input(), graph.input());
    let f = graph.linear(x, w, b)?;

    let mut feed = FeedDict::new();
    feed.bind("X", x, [6.0, 14.0, 3.0])?
        .bind_transposed("W", w, [0.5, 0.25, 1.4])?
        .bind("b", b, 2)?;
    let order = graph.topological_sort(&feed)?;

    println!("Linear: {}", graph.forward_backward(f, &order)?);
    Ok(())
}

fn sigmoid() -> Result<(), MiniflowError> {
    let mut graph = Graph::new();
    let (x, w, b) = (graph.input(), graph.input(), graph.input());
    let f = graph.linear(x, w, b)?;
    let g = graph.sigmoid(f)?;

    let mut feed = FeedDict::new();
    feed.bind("X", x, [[-1.0, -2.0], [-1.0, -2.0]])?
        .bind("W", w, [[2.0, -3.0], [2.0, -3.0]])?
        .bind("b", b, [-3.0, -5.0])?;
    let order = graph.topological_sort(&feed)?;

    println!("Sigmoid:\n{}", graph.forward_backward(g, &order)?);
    Ok(())
}

fn mse() -> Result<(), MiniflowError> {
    let mut graph = Graph::new();
    let (y, a) = (graph.input(), graph.input());
    let cost = graph.mse(y, a)?;

    let mut feed = FeedDict::new();
    feed.bind_transposed("y", y, [1.0, 2.0, 3.0])?
        .bind_transposed("a", a, [4.5, 5.0, 10.0])?;
    let order = graph.topological_sort(&feed)?;

    println!("MSE: {}", graph.forward_backward(cost, &order)?);
    Ok(())
}

fn backprop() -> Result<(), MiniflowError> {
    let mut graph = Graph::new();
    let (x, w, b, y) = (graph.input(), graph.input(), graph.input(), graph.input());
    let f = graph.linear(x, w, b)?;
    let a = graph.sigmoid(f)?;
    let cost = graph.mse(y, a)?;

    let mut feed = FeedDict::new();
    feed.bind("X", x, [[-1.0, -2.0], [-1.0, -2.0]])?
        .bind("W", w, [[2.0], [3.0]])?
        .bind("b", b, [-3.0])?
        .bind_transposed("y", y, [1.0, 2.0])?;
    let order = graph.topological_sort(&feed)?;
    graph.forward_backward(cost, &order)?;

    println!("Backprop:");
    for (name, id) in [("X", x), ("y", y), ("W", w), ("b", b)] {
        if let Some(grad) = graph.gradient(id, id) {
            println!("d cost / d {}:\n{}", name, grad);
        }
    }
    Ok(())
}

fn main() -> Result<(), MiniflowError> {
    env_logger::init();

    let demos: [fn() -> Result<(), MiniflowError>; 6] =
        [add, multiply, linear, sigmoid, mse, backprop];
    println!("-------------");
    for demo in demos {
        demo()?;
        println!("-------------");
    }
    Ok(())
}
