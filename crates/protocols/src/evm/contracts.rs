use ethers::prelude::abigen;

abigen!(
    Erc20,
    r#"[
        function symbol() external view returns (string)
        function decimals() external view returns (uint8)
        function balanceOf(address account) external view returns (uint256)
    ]"#
);

abigen!(
    UniswapV2Pair,
    r#"[
        function totalSupply() external view returns (uint256)
        function token0() external view returns (address)
        function token1() external view returns (address)
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)
    ]"#
);

abigen!(
    UniswapV2Factory,
    r#"[
        function getPair(address tokenA, address tokenB) external view returns (address pair)
    ]"#
);

abigen!(
    UniswapV2Router02,
    r#"[
        function factory() external view returns (address)
        function getAmountOut(uint256 amountIn, uint256 reserveIn, uint256 reserveOut) external pure returns (uint256 amountOut)
        function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts)
        function addLiquidityETH(address token, uint256 amountTokenDesired, uint256 amountTokenMin, uint256 amountETHMin, address to, uint256 deadline) external payable returns (uint256 amountToken, uint256 amountETH, uint256 liquidity)
    ]"#
);

abigen!(
    MiniChefV2,
    r#"[
        function SUSHI() external view returns (address)
        function lpToken(uint256 pid) external view returns (address)
        function rewarder(uint256 pid) external view returns (address)
        function pendingSushi(uint256 pid, address user) external view returns (uint256 pending)
        function userInfo(uint256 pid, address user) external view returns (uint256 amount, int256 rewardDebt)
        function harvest(uint256 pid, address to) external
        function deposit(uint256 pid, uint256 amount, address to) external
    ]"#
);

abigen!(
    Rewarder,
    r#"[
        function rewardToken() external view returns (address)
        function pendingToken(uint256 pid, address user) external view returns (uint256 pending)
    ]"#
);
