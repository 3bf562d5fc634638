mod properties;
mod quadrature;
