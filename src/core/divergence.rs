use crate::types::GradientField;
use ndarray::{s, Array2, Zip};

/// Backward-difference divergence of the padded gradient field.
///
/// This is the right-hand side of the discrete Poisson equation:
/// `D[:, 0] = dx[:, 0]`, `D[:, j] = dx[:, j] - dx[:, j-1]`, plus the same
/// along rows for `dy`.
pub fn divergence(gradients: &GradientField) -> Array2<f64> {
    let (rows, cols) = gradients.dim();
    let dx = &gradients.dx;
    let dy = &gradients.dy;
    let mut rhs = Array2::<f64>::zeros((rows, cols));

    rhs.column_mut(0).assign(&dx.column(0));
    if cols > 1 {
        Zip::from(rhs.slice_mut(s![.., 1..]))
            .and(dx.slice(s![.., 1..]))
            .and(dx.slice(s![.., ..cols - 1]))
            .for_each(|d, &current, &previous| *d = current - previous);
    }

    {
        let mut first_row = rhs.row_mut(0);
        first_row += &dy.row(0);
    }
    if rows > 1 {
        Zip::from(rhs.slice_mut(s![1.., ..]))
            .and(dy.slice(s![1.., ..]))
            .and(dy.slice(s![..rows - 1, ..]))
            .for_each(|d, &current, &previous| *d += current - previous);
    }

    rhs
}
