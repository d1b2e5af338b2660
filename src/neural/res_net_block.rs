use tch::{nn, Tensor};

/// Channel count must be divisible by this.
pub const NORM_GROUPS: i64 = 8;

/// Two 3×3 convolutions with GroupNorm and an identity skip, channel count preserved.
#[derive(Debug)]
pub struct ResNetBlock {
    conv1: nn::Conv2D,
    gn1: nn::GroupNorm,
    conv2: nn::Conv2D,
    gn2: nn::GroupNorm,
}

fn conv3x3(path: nn::Path, channels: i64) -> nn::Conv2D {
    nn::conv2d(
        path,
        channels,
        channels,
        3,
        nn::ConvConfig {
            padding: 1,
            ..Default::default()
        },
    )
}

impl ResNetBlock {
    pub fn new(path: &nn::Path, channels: i64) -> Self {
        Self {
            conv1: conv3x3(path / "conv1", channels),
            gn1: nn::group_norm(path / "gn1", NORM_GROUPS, channels, Default::default()),
            conv2: conv3x3(path / "conv2", channels),
            gn2: nn::group_norm(path / "gn2", NORM_GROUPS, channels, Default::default()),
        }
    }

    pub fn forward(&self, x: &Tensor, train: bool) -> Tensor {
        let out = x.apply(&self.conv1).apply_t(&self.gn1, train).relu();
        let out = out.apply(&self.conv2).apply_t(&self.gn2, train);
        (out + x).relu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Device;

    #[test]
    fn test_block_preserves_board_shape() {
        let vs = nn::VarStore::new(Device::Cpu);
        let block = ResNetBlock::new(&(vs.root() / "block"), 16);

        let input = Tensor::rand([2, 16, 6, 7], tch::kind::FLOAT_CPU);
        let output = block.forward(&input, false);

        assert_eq!(output.size(), vec![2, 16, 6, 7]);
        assert!(output.min().double_value(&[]) >= 0.0);
    }
}
