use tch::{nn, Kind, Tensor};

use crate::game::board::{COLUMNS, PLANES, ROWS};
use crate::neural::res_net_block::{ResNetBlock, NORM_GROUPS};

const CELLS: i64 = (ROWS * COLUMNS) as i64;
const POLICY_CHANNELS: i64 = 2;
const VALUE_HIDDEN: i64 = 64;

/// Shared residual trunk with a policy head and a value head.
///
/// Input `[N, 4, 6, 7]`; outputs `[N, 7]` log-probabilities and `[N]` values in [-1, 1].
#[derive(Debug)]
pub struct PolicyValueNet {
    stem: nn::Conv2D,
    stem_gn: nn::GroupNorm,
    blocks: Vec<ResNetBlock>,
    policy_conv: nn::Conv2D,
    policy_fc: nn::Linear,
    value_conv: nn::Conv2D,
    value_fc1: nn::Linear,
    value_fc2: nn::Linear,
}

impl PolicyValueNet {
    pub fn new(vs: &nn::VarStore, channels: i64, blocks: usize) -> Self {
        let p = vs.root();

        let stem = nn::conv2d(
            &p / "stem",
            PLANES as i64,
            channels,
            3,
            nn::ConvConfig {
                padding: 1,
                ..Default::default()
            },
        );
        let stem_gn = nn::group_norm(&p / "stem_gn", NORM_GROUPS, channels, Default::default());

        let blocks = (0..blocks)
            .map(|idx| ResNetBlock::new(&(&p / format!("block_{idx}")), channels))
            .collect();

        let policy_conv = nn::conv2d(
            &p / "policy_conv",
            channels,
            POLICY_CHANNELS,
            1,
            Default::default(),
        );
        let policy_fc = nn::linear(
            &p / "policy_fc",
            POLICY_CHANNELS * CELLS,
            COLUMNS as i64,
            Default::default(),
        );

        let value_conv = nn::conv2d(&p / "value_conv", channels, 1, 1, Default::default());
        let value_fc1 = nn::linear(&p / "value_fc1", CELLS, VALUE_HIDDEN, Default::default());
        let value_fc2 = nn::linear(&p / "value_fc2", VALUE_HIDDEN, 1, Default::default());

        initialize_weights(vs);

        Self {
            stem,
            stem_gn,
            blocks,
            policy_conv,
            policy_fc,
            value_conv,
            value_fc1,
            value_fc2,
        }
    }

    pub fn forward(&self, x: &Tensor, train: bool) -> (Tensor, Tensor) {
        let mut h = x.apply(&self.stem).apply_t(&self.stem_gn, train).relu();
        for block in &self.blocks {
            h = block.forward(&h, train);
        }

        let policy = h
            .apply(&self.policy_conv)
            .relu()
            .flatten(1, -1)
            .apply(&self.policy_fc)
            .log_softmax(-1, Kind::Float);

        let value = h
            .apply(&self.value_conv)
            .relu()
            .flatten(1, -1)
            .apply(&self.value_fc1)
            .relu()
            .apply(&self.value_fc2)
            .tanh()
            .view([-1]);

        (policy, value)
    }
}

/// Xavier-uniform weights, zero biases. Normalisation scales keep their default.
pub fn initialize_weights(vs: &nn::VarStore) {
    for (name, mut param) in vs.variables() {
        let fans = match param.size().as_slice() {
            [out, inp, kh, kw] => Some(((inp * kh * kw) as f64, (out * kh * kw) as f64)),
            [out, inp] => Some((*inp as f64, *out as f64)),
            _ => None,
        };
        if fans.is_none() && name.ends_with(".weight") {
            continue;
        }
        let result = tch::no_grad(|| match fans {
            Some((fan_in, fan_out)) => {
                let bound = (6.0 / (fan_in + fan_out)).sqrt();
                param.f_uniform_(-bound, bound).map(|_| ())
            }
            None => param.f_zero_().map(|_| ()),
        });
        if let Err(e) = result {
            log::warn!("weight init failed for {}: {}", name, e);
        }
    }
}
