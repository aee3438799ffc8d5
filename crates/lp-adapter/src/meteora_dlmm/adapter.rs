//! Plan assembly for the bin family: resolves ranges (including the
//! two-array widening rule), conditionally creates supporting accounts, and
//! emits ordered instruction lists.

use rust_decimal::Decimal;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Keypair, signer::Signer};
use tracing::debug;

use super::state::{LbPair, PositionV2, POSITION_OWNER_OFFSET};
use super::{
    add_liquidity, anchor_account_discriminator, claim_fee, claim_reward, close_position,
    derive_bin_array, derive_bitmap_extension, derive_event_authority, initialize_bin_array,
    initialize_bitmap_extension, initialize_position, math, remove_liquidity,
    LiquidityParameterByStrategy, StrategyParameters, DLMM_PROGRAM_ID, MAX_POSITION_WIDTH,
};
use crate::adapter::{fetch_pool, mint_info, DecodedPool};
use crate::cache::StateCache;
use crate::config::AdapterConfig;
use crate::error::{Error, RangeError, Result};
use crate::range::PriceRange;
use crate::rpc::{AccountFilter, AccountReader};
use crate::types::{InstructionPlan, PoolSnapshot, PositionSnapshot, ProtocolKind, RewardSlot, Token};
use crate::utils::{
    associated_token_address, create_ata_idempotent_instruction, token_program_for_mint,
    ui_amount_to_amount, unwrap_wsol_instruction, wrap_sol_instructions, WSOL_MINT,
};

async fn dlmm_pool<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    address: &Pubkey,
    refresh: bool,
) -> Result<LbPair> {
    match fetch_pool(reader, cache, address, refresh).await? {
        DecodedPool::Dlmm(pair) => Ok(pair),
        DecodedPool::Clmm(_) => Err(Error::UnexpectedAccountOwner {
            address: *address,
            owner: crate::raydium_clmm::CLMM_PROGRAM_ID,
            expected: DLMM_PROGRAM_ID,
        }),
    }
}

/// Fetch a position account by address.
pub async fn fetch_position<R: AccountReader>(
    reader: &R,
    address: &Pubkey,
) -> Result<PositionV2> {
    let account = reader
        .read_account(address)
        .await?
        .ok_or(Error::PositionNotFound(*address))?;
    PositionV2::decode(&account.data)
}

/// Token decimals for both sides; the pair account does not carry them.
async fn pair_decimals<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    pair: &LbPair,
) -> Result<(u8, u8)> {
    let (decimals_x, _) = mint_info(reader, cache, &pair.mint_x).await?;
    let (decimals_y, _) = mint_info(reader, cache, &pair.mint_y).await?;
    Ok((decimals_x, decimals_y))
}

/// Resolve a caller range to bin bounds.
pub async fn resolve_range<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    pair: &LbPair,
    range: &PriceRange,
) -> Result<(i32, i32)> {
    let (lower, upper) = match range {
        PriceRange::SingleUnit => math::one_bin_range(pair.active_id),
        PriceRange::Units { lower, upper } => (*lower, *upper),
        _ => {
            let (decimals_x, decimals_y) = pair_decimals(reader, cache, pair).await?;
            let price =
                math::bin_to_price(pair.active_id, pair.bin_step, decimals_x, decimals_y)?;
            let (lower_price, upper_price) = range.to_absolute(price)?;
            (
                math::price_to_bin(lower_price, pair.bin_step, decimals_x, decimals_y)?,
                math::price_to_bin(upper_price, pair.bin_step, decimals_x, decimals_y)?,
            )
        }
    };
    if lower > upper {
        return Err(RangeError::LowerGreaterThanUpper {
            lower: lower.to_string(),
            upper: upper.to_string(),
        }
        .into());
    }
    for bin in [lower, upper] {
        if !(super::MIN_BIN_ID..=super::MAX_BIN_ID).contains(&bin) {
            return Err(RangeError::OutOfBounds {
                unit: "bin",
                value: bin as i64,
                min: super::MIN_BIN_ID as i64,
                max: super::MAX_BIN_ID as i64,
            }
            .into());
        }
    }
    Ok((lower, upper))
}

/// The program borrows the lower and upper bin arrays as two distinct
/// mutable accounts, so a position confined to one array must be widened to
/// touch the neighboring one. The side nearer an array edge gives up one
/// bin past that edge.
pub fn widen_to_two_arrays(lower_bin: i32, upper_bin: i32) -> (i32, i32) {
    let lower_index = math::bin_array_index(lower_bin);
    let upper_index = math::bin_array_index(upper_bin);
    if lower_index != upper_index {
        return (lower_bin, upper_bin);
    }
    let (array_lower, array_upper) = math::bin_array_bounds(lower_index);
    let dist_to_lower = (lower_bin - (array_lower - 1)).abs();
    let dist_to_upper = ((array_upper + 1) - upper_bin).abs();
    if dist_to_lower <= dist_to_upper {
        (array_lower - 1, upper_bin)
    } else {
        (lower_bin, array_upper + 1)
    }
}

/// Bin arrays the range touches that do not exist yet, in ascending order.
async fn missing_bin_arrays<R: AccountReader>(
    reader: &R,
    lb_pair: &Pubkey,
    lower_bin: i32,
    upper_bin: i32,
) -> Result<Vec<i64>> {
    let mut missing = Vec::new();
    for index in math::bin_array_indices(lower_bin, upper_bin) {
        let address = derive_bin_array(lb_pair, index)?.address;
        let exists = matches!(
            reader.read_account(&address).await?,
            Some(account) if account.data.len() >= 8
        );
        if !exists {
            missing.push(index);
        }
    }
    Ok(missing)
}

async fn bitmap_extension_if_present<R: AccountReader>(
    reader: &R,
    lb_pair: &Pubkey,
) -> Result<Option<Pubkey>> {
    let address = derive_bitmap_extension(lb_pair)?.address;
    let present = matches!(
        reader.read_account(&address).await?,
        Some(account) if !account.data.is_empty()
    );
    Ok(present.then_some(address))
}

/// Open: ensure every touched bin array and the bitmap extension exist,
/// initialize the position (a fresh keypair), then deposit.
#[allow(clippy::too_many_arguments)]
pub async fn open_plan<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    config: &AdapterConfig,
    pool_address: &Pubkey,
    range: &PriceRange,
    amount_x: Decimal,
    amount_y: Decimal,
    owner: &Pubkey,
    slippage_bps: Option<u16>,
) -> Result<InstructionPlan> {
    let pair = dlmm_pool(reader, cache, pool_address, false).await?;
    let (lower_bin, upper_bin) = resolve_range(reader, cache, &pair, range).await?;
    let (lower_bin, upper_bin) = widen_to_two_arrays(lower_bin, upper_bin);
    let width = upper_bin - lower_bin + 1;
    if width > MAX_POSITION_WIDTH {
        return Err(RangeError::OutOfBounds {
            unit: "position width",
            value: width as i64,
            min: 1,
            max: MAX_POSITION_WIDTH as i64,
        }
        .into());
    }
    debug!(%pool_address, lower_bin, upper_bin, "building open position plan");

    let mut instructions = Vec::new();

    for index in missing_bin_arrays(reader, pool_address, lower_bin, upper_bin).await? {
        instructions.push(initialize_bin_array::build(
            &initialize_bin_array::InitializeBinArrayAccounts {
                lb_pair: *pool_address,
                bin_array: derive_bin_array(pool_address, index)?.address,
                funder: *owner,
            },
            &initialize_bin_array::InitializeBinArrayArgs { index },
        )?);
    }

    let bitmap_extension = bitmap_extension_if_present(reader, pool_address).await?;
    if bitmap_extension.is_none() {
        instructions.push(initialize_bitmap_extension::build(
            &initialize_bitmap_extension::InitializeBitmapExtensionAccounts {
                lb_pair: *pool_address,
                bin_array_bitmap_extension: derive_bitmap_extension(pool_address)?.address,
                funder: *owner,
            },
        ));
    }

    let event_authority = derive_event_authority()?.address;
    let position = Keypair::new();
    let position_pubkey = position.pubkey();
    instructions.push(initialize_position::build(
        &initialize_position::InitializePositionAccounts {
            payer: *owner,
            position: position_pubkey,
            lb_pair: *pool_address,
            owner: *owner,
            event_authority,
        },
        &initialize_position::InitializePositionArgs {
            lower_bin_id: lower_bin,
            width,
        },
    )?);

    instructions.extend(
        deposit_ixs(
            reader,
            cache,
            config,
            pool_address,
            &pair,
            &position_pubkey,
            owner,
            amount_x,
            amount_y,
            lower_bin,
            upper_bin,
            slippage_bps,
            bitmap_extension,
        )
        .await?,
    );

    Ok(InstructionPlan::new(instructions)
        .with_signer(position)
        .with_position_id(position_pubkey))
}

/// WSOL wrap + ATA creation + `add_liquidity_by_strategy`, shared by open
/// and add.
#[allow(clippy::too_many_arguments)]
async fn deposit_ixs<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    config: &AdapterConfig,
    pool_address: &Pubkey,
    pair: &LbPair,
    position: &Pubkey,
    owner: &Pubkey,
    amount_x: Decimal,
    amount_y: Decimal,
    lower_bin: i32,
    upper_bin: i32,
    slippage_bps: Option<u16>,
    bitmap_extension: Option<Pubkey>,
) -> Result<Vec<Instruction>> {
    let (decimals_x, program_x) = mint_info(reader, cache, &pair.mint_x).await?;
    let (decimals_y, program_y) = mint_info(reader, cache, &pair.mint_y).await?;
    let amount_x_raw = ui_amount_to_amount(amount_x, decimals_x)?;
    let amount_y_raw = ui_amount_to_amount(amount_y, decimals_y)?;
    let slippage = slippage_bps.unwrap_or(config.default_slippage_bps);

    let mut instructions = Vec::new();
    if pair.mint_x == WSOL_MINT && amount_x_raw > 0 {
        instructions.extend(wrap_sol_instructions(
            owner,
            amount_x_raw + config.wsol_wrap_buffer_lamports,
        ));
    }
    if pair.mint_y == WSOL_MINT && amount_y_raw > 0 {
        instructions.extend(wrap_sol_instructions(
            owner,
            amount_y_raw + config.wsol_wrap_buffer_lamports,
        ));
    }
    instructions.push(create_ata_idempotent_instruction(
        owner, owner, &pair.mint_x, &program_x,
    ));
    instructions.push(create_ata_idempotent_instruction(
        owner, owner, &pair.mint_y, &program_y,
    ));

    let accounts = add_liquidity::AddLiquidityAccounts {
        position: *position,
        lb_pair: *pool_address,
        bin_array_bitmap_extension: bitmap_extension,
        user_token_x: associated_token_address(owner, &pair.mint_x, &program_x),
        user_token_y: associated_token_address(owner, &pair.mint_y, &program_y),
        reserve_x: pair.reserve_x,
        reserve_y: pair.reserve_y,
        token_x_mint: pair.mint_x,
        token_y_mint: pair.mint_y,
        bin_array_lower: derive_bin_array(pool_address, math::bin_array_index(lower_bin))?
            .address,
        bin_array_upper: derive_bin_array(pool_address, math::bin_array_index(upper_bin))?
            .address,
        sender: *owner,
        token_x_program: program_x,
        token_y_program: program_y,
        event_authority: derive_event_authority()?.address,
    };
    let params = LiquidityParameterByStrategy {
        amount_x: amount_x_raw,
        amount_y: amount_y_raw,
        active_id: pair.active_id,
        // bin-denominated slippage, one bin per 10 bps of tolerance
        max_active_bin_slippage: (slippage / 10).max(1) as i32,
        strategy_parameters: StrategyParameters::spot_balanced(lower_bin, upper_bin),
    };
    instructions.push(add_liquidity::build(&accounts, &params)?);
    Ok(instructions)
}

/// Add liquidity to an existing position over its stored bin range.
#[allow(clippy::too_many_arguments)]
pub async fn add_plan<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    config: &AdapterConfig,
    position_address: &Pubkey,
    position: &PositionV2,
    amount_x: Decimal,
    amount_y: Decimal,
    owner: &Pubkey,
    slippage_bps: Option<u16>,
) -> Result<InstructionPlan> {
    let pair = dlmm_pool(reader, cache, &position.lb_pair, false).await?;
    let lb_pair = position.lb_pair;

    let mut instructions = Vec::new();
    let bitmap_extension = bitmap_extension_if_present(reader, &lb_pair).await?;
    if bitmap_extension.is_none() {
        instructions.push(initialize_bitmap_extension::build(
            &initialize_bitmap_extension::InitializeBitmapExtensionAccounts {
                lb_pair,
                bin_array_bitmap_extension: derive_bitmap_extension(&lb_pair)?.address,
                funder: *owner,
            },
        ));
    }
    instructions.extend(
        deposit_ixs(
            reader,
            cache,
            config,
            &lb_pair,
            &pair,
            position_address,
            owner,
            amount_x,
            amount_y,
            position.lower_bin_id,
            position.upper_bin_id,
            slippage_bps,
            bitmap_extension,
        )
        .await?,
    );
    Ok(InstructionPlan::new(instructions))
}

fn withdraw_accounts(
    pair: &LbPair,
    lb_pair: &Pubkey,
    position_address: &Pubkey,
    position: &PositionV2,
    owner: &Pubkey,
    program_x: Pubkey,
    program_y: Pubkey,
    bitmap_extension: Option<Pubkey>,
) -> Result<remove_liquidity::RemoveLiquidityAccounts> {
    Ok(remove_liquidity::RemoveLiquidityAccounts {
        position: *position_address,
        lb_pair: *lb_pair,
        bin_array_bitmap_extension: bitmap_extension,
        user_token_x: associated_token_address(owner, &pair.mint_x, &program_x),
        user_token_y: associated_token_address(owner, &pair.mint_y, &program_y),
        reserve_x: pair.reserve_x,
        reserve_y: pair.reserve_y,
        token_x_mint: pair.mint_x,
        token_y_mint: pair.mint_y,
        bin_array_lower: derive_bin_array(
            lb_pair,
            math::bin_array_index(position.lower_bin_id),
        )?
        .address,
        bin_array_upper: derive_bin_array(
            lb_pair,
            math::bin_array_index(position.upper_bin_id),
        )?
        .address,
        sender: *owner,
        token_x_program: program_x,
        token_y_program: program_y,
        event_authority: derive_event_authority()?.address,
    })
}

/// Remove a basis-point share of the liquidity in the position's range.
pub async fn remove_plan<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    position_address: &Pubkey,
    position: &PositionV2,
    owner: &Pubkey,
    bps: u16,
) -> Result<InstructionPlan> {
    let pair = dlmm_pool(reader, cache, &position.lb_pair, true).await?;
    if position.total_liquidity() == 0 {
        debug!(position = %position_address, "no liquidity to remove");
        return Ok(InstructionPlan::new(vec![]));
    }
    let (_, program_x) = mint_info(reader, cache, &pair.mint_x).await?;
    let (_, program_y) = mint_info(reader, cache, &pair.mint_y).await?;
    let bitmap_extension = bitmap_extension_if_present(reader, &position.lb_pair).await?;

    let mut instructions = vec![
        create_ata_idempotent_instruction(owner, owner, &pair.mint_x, &program_x),
        create_ata_idempotent_instruction(owner, owner, &pair.mint_y, &program_y),
    ];
    let accounts = withdraw_accounts(
        &pair,
        &position.lb_pair,
        position_address,
        position,
        owner,
        program_x,
        program_y,
        bitmap_extension,
    )?;
    instructions.push(remove_liquidity::build(
        &accounts,
        &remove_liquidity::RemoveLiquidityArgs {
            from_bin_id: position.lower_bin_id,
            to_bin_id: position.upper_bin_id,
            bps_to_remove: bps.min(10_000),
        },
    )?);
    Ok(InstructionPlan::new(instructions))
}

/// Claim swap fees plus every live reward slot.
pub async fn claim_plan<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    position_address: &Pubkey,
    position: &PositionV2,
    owner: &Pubkey,
) -> Result<InstructionPlan> {
    let pair = dlmm_pool(reader, cache, &position.lb_pair, true).await?;
    let instructions =
        claim_ixs(reader, cache, &pair, position_address, position, owner).await?;
    Ok(InstructionPlan::new(instructions))
}

async fn claim_ixs<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    pair: &LbPair,
    position_address: &Pubkey,
    position: &PositionV2,
    owner: &Pubkey,
) -> Result<Vec<Instruction>> {
    let lb_pair = position.lb_pair;
    let (_, program_x) = mint_info(reader, cache, &pair.mint_x).await?;
    let (_, program_y) = mint_info(reader, cache, &pair.mint_y).await?;
    let event_authority = derive_event_authority()?.address;
    let bin_array_lower =
        derive_bin_array(&lb_pair, math::bin_array_index(position.lower_bin_id))?.address;
    let bin_array_upper =
        derive_bin_array(&lb_pair, math::bin_array_index(position.upper_bin_id))?.address;

    let mut instructions = vec![
        create_ata_idempotent_instruction(owner, owner, &pair.mint_x, &program_x),
        create_ata_idempotent_instruction(owner, owner, &pair.mint_y, &program_y),
    ];
    instructions.push(claim_fee::build(
        &claim_fee::ClaimFeeAccounts {
            lb_pair,
            position: *position_address,
            bin_array_lower,
            bin_array_upper,
            sender: *owner,
            reserve_x: pair.reserve_x,
            reserve_y: pair.reserve_y,
            user_token_x: associated_token_address(owner, &pair.mint_x, &program_x),
            user_token_y: associated_token_address(owner, &pair.mint_y, &program_y),
            token_x_mint: pair.mint_x,
            token_y_mint: pair.mint_y,
            token_x_program: program_x,
            token_y_program: program_y,
            event_authority,
        },
        (position.lower_bin_id, position.upper_bin_id),
    )?);

    for (index, reward) in pair.live_rewards() {
        let reward_program = match cache.token_program(&reward.mint) {
            Some(program) => program,
            None => {
                let account = reader.read_account(&reward.mint).await?;
                let program =
                    token_program_for_mint(&reward.mint, account.as_ref().map(|a| &a.owner));
                cache.store_token_program(reward.mint, program);
                program
            }
        };
        instructions.push(create_ata_idempotent_instruction(
            owner,
            owner,
            &reward.mint,
            &reward_program,
        ));
        instructions.push(claim_reward::build(
            &claim_reward::ClaimRewardAccounts {
                lb_pair,
                position: *position_address,
                bin_array_lower,
                bin_array_upper,
                sender: *owner,
                reward_vault: reward.vault,
                reward_mint: reward.mint,
                user_token_account: associated_token_address(owner, &reward.mint, &reward_program),
                event_authority,
            },
            &claim_reward::ClaimRewardArgs {
                reward_index: index as u64,
            },
        )?);
    }
    Ok(instructions)
}

/// Close: remove everything, claim fees and rewards, then close the
/// account. The program rejects closes with residual liquidity or
/// unclaimed fees, so the order is load-bearing.
pub async fn close_plan<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    config: &AdapterConfig,
    position_address: &Pubkey,
    position: &PositionV2,
    owner: &Pubkey,
) -> Result<InstructionPlan> {
    let pair = dlmm_pool(reader, cache, &position.lb_pair, true).await?;
    let mut instructions = Vec::new();

    if position.total_liquidity() > 0 {
        let removal = remove_plan(reader, cache, position_address, position, owner, 10_000)
            .await?;
        instructions.extend(removal.instructions);
    }
    instructions
        .extend(claim_ixs(reader, cache, &pair, position_address, position, owner).await?);

    let event_authority = derive_event_authority()?.address;
    instructions.push(close_position::build(&close_position::ClosePositionAccounts {
        position: *position_address,
        lb_pair: position.lb_pair,
        bin_array_lower: derive_bin_array(
            &position.lb_pair,
            math::bin_array_index(position.lower_bin_id),
        )?
        .address,
        bin_array_upper: derive_bin_array(
            &position.lb_pair,
            math::bin_array_index(position.upper_bin_id),
        )?
        .address,
        sender: *owner,
        rent_receiver: *owner,
        event_authority,
    }));

    if config.unwrap_wsol_on_close && (pair.mint_x == WSOL_MINT || pair.mint_y == WSOL_MINT) {
        instructions.push(unwrap_wsol_instruction(owner));
    }
    Ok(InstructionPlan::new(instructions))
}

/// Scan the program for the owner's positions via memcmp filters on the
/// discriminator and owner field.
pub async fn positions_by_owner<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    owner: &Pubkey,
    pool_filter: Option<&Pubkey>,
) -> Result<Vec<PositionSnapshot>> {
    let filters = vec![
        AccountFilter::memcmp(
            0,
            anchor_account_discriminator(PositionV2::ACCOUNT_NAME).to_vec(),
        ),
        AccountFilter::memcmp(POSITION_OWNER_OFFSET, owner.as_ref().to_vec()),
    ];
    let accounts = reader
        .program_accounts_by_filter(&DLMM_PROGRAM_ID, &filters)
        .await?;

    let mut snapshots = Vec::new();
    for (address, account) in accounts {
        let position = match PositionV2::decode(&account.data) {
            Ok(position) => position,
            Err(err) => {
                debug!(%address, %err, "skipping undecodable position");
                continue;
            }
        };
        if let Some(filter) = pool_filter {
            if position.lb_pair != *filter {
                continue;
            }
        }
        match dlmm_pool(reader, cache, &position.lb_pair, false).await {
            Ok(pair) => {
                let snapshot =
                    position_snapshot(reader, cache, &pair, &address, &position).await?;
                snapshots.push(snapshot);
            }
            Err(err) => {
                debug!(%address, %err, "skipping position with unavailable pool");
            }
        }
    }
    Ok(snapshots)
}

/// Reduce a decoded pair to the caller-facing snapshot.
pub async fn pool_snapshot<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    address: &Pubkey,
    pair: &LbPair,
) -> Result<PoolSnapshot> {
    let (decimals_x, decimals_y) = pair_decimals(reader, cache, pair).await?;
    Ok(PoolSnapshot {
        address: *address,
        protocol: ProtocolKind::Bin,
        token_a: Token {
            mint: pair.mint_x,
            decimals: decimals_x,
        },
        token_b: Token {
            mint: pair.mint_y,
            decimals: decimals_y,
        },
        price: math::bin_to_price(pair.active_id, pair.bin_step, decimals_x, decimals_y)?,
        step: pair.bin_step,
        current_unit: pair.active_id,
        liquidity: 0,
        rewards: pair
            .live_rewards()
            .map(|(_, r)| RewardSlot {
                mint: r.mint,
                vault: r.vault,
            })
            .collect(),
    })
}

/// Reduce a decoded position to the caller-facing snapshot.
pub async fn position_snapshot<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    pair: &LbPair,
    address: &Pubkey,
    position: &PositionV2,
) -> Result<PositionSnapshot> {
    let (decimals_x, decimals_y) = pair_decimals(reader, cache, pair).await?;
    Ok(PositionSnapshot {
        id: *address,
        pool: position.lb_pair,
        protocol: ProtocolKind::Bin,
        owner: Some(position.owner),
        lower_unit: position.lower_bin_id,
        upper_unit: position.upper_bin_id,
        price_lower: math::bin_to_price(
            position.lower_bin_id,
            pair.bin_step,
            decimals_x,
            decimals_y,
        )?,
        price_upper: math::bin_to_price(
            position.upper_bin_id,
            pair.bin_step,
            decimals_x,
            decimals_y,
        )?,
        liquidity: position.total_liquidity(),
        active_units: position.active_bins(),
        fees_owed_a: 0,
        fees_owed_b: 0,
        in_range: (position.lower_bin_id..=position.upper_bin_id).contains(&pair.active_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_already_spanning_two_arrays_is_untouched() {
        assert_eq!(widen_to_two_arrays(-1, 0), (-1, 0));
        assert_eq!(widen_to_two_arrays(60, 150), (60, 150));
    }

    #[test]
    fn single_array_range_widens_toward_the_nearer_edge() {
        // bins 0..=10 sit in array 0 (bins 0..=69); the lower bound is much
        // closer to the previous array, so it gives up one bin
        assert_eq!(widen_to_two_arrays(0, 10), (-1, 10));
        // bins 60..=69: upper edge is adjacent, widen upward
        assert_eq!(widen_to_two_arrays(60, 69), (60, 70));
        // a single centered bin widens toward whichever edge is nearer
        let (lower, upper) = widen_to_two_arrays(35, 35);
        assert!(math::bin_array_index(lower) != math::bin_array_index(upper));
    }

    #[test]
    fn widened_range_always_spans_exactly_two_arrays() {
        for (lower, upper) in [(0, 0), (0, 69), (69, 69), (-70, -1), (-35, -30), (140, 141)] {
            let (w_lower, w_upper) = widen_to_two_arrays(lower, upper);
            let spanned = math::bin_array_indices(w_lower, w_upper).len();
            assert_eq!(spanned, 2, "range {lower}..={upper} -> {w_lower}..={w_upper}");
            // the caller's bins remain inside the widened range
            assert!(w_lower <= lower && upper <= w_upper);
        }
    }
}
